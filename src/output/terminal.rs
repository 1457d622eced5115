use crate::models::{IssueSource, PageReport, ReportIssue, Severity, Status};
use colored::*;

pub fn print_report(report: &PageReport) {
    print_header(report);
    print_issue_section("URL Reputation", report, IssueSource::Url);
    print_issue_section("Business Registration", report, IssueSource::Company);
    print_issue_section("Script Findings", report, IssueSource::Javascript);
    print_domain_section(report);
    print_company_section(report);
}

fn print_header(report: &PageReport) {
    println!("{}", "┌─────────────────────────────────────────────────────────────┐".bright_black());
    println!("│  URL: {:<54}│", report.url.bold());

    let status_colored = match report.status {
        Status::Danger => report.status.as_str().red().bold(),
        Status::Warning => report.status.as_str().yellow(),
        Status::Safe => report.status.as_str().green(),
    };
    let checked = report.checked_at.format("%Y-%m-%d %H:%M:%S UTC");
    println!("│  Status: {} │ Checked: {:<31}│", status_colored, checked.to_string());
    println!("│  Issues: {:<51}│", report.issues.len());
    println!("{}", "└─────────────────────────────────────────────────────────────┘".bright_black());
    println!();
}

fn print_issue_section(title: &str, report: &PageReport, source: IssueSource) {
    let issues: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.source == source)
        .collect();

    if issues.is_empty() {
        return;
    }

    let rule = format!("── {} {}", title, "─".repeat(58usize.saturating_sub(title.len())));
    println!("{}", rule.bright_black());

    for issue in issues {
        print_issue(issue);
    }

    println!();
}

fn print_issue(issue: &ReportIssue) {
    let (icon, severity_colored) = match issue.severity {
        Severity::High => ("✖".red(), issue.severity.as_str().red().bold()),
        Severity::Medium => ("⚠".yellow(), issue.severity.as_str().yellow()),
        Severity::Low => ("●".blue(), issue.severity.as_str().blue()),
    };

    println!("  {} {:8}  {}", icon, severity_colored, issue.kind);

    if !issue.description.is_empty() {
        for line in textwrap::wrap(&issue.description, 58) {
            println!("            {}", line.bright_black());
        }
    }

    println!();
}

fn print_domain_section(report: &PageReport) {
    if report.domain.providers.is_empty() {
        return;
    }

    println!("{}", "── Reputation Providers ─────────────────────────────────────".bright_black());

    for result in &report.domain.providers {
        let verdict = match result.malicious {
            Some(true) => "MALICIOUS".red().bold(),
            Some(false) => "CLEAN".green(),
            None => "UNKNOWN".bright_black(),
        };
        println!("  {} {:<20} {}", "→".bright_black(), result.provider, verdict);

        if !result.threats.is_empty() {
            println!("    Threats: {}", result.threats.join(", ").yellow());
        }
    }

    println!();
}

fn print_company_section(report: &PageReport) {
    let Some(ref company) = report.company else {
        return;
    };

    println!("{}", "── Company ──────────────────────────────────────────────────".bright_black());
    println!("  Business number: {}", company.business_number.bold());

    match &company.registry {
        Some(status) => {
            let validity = if status.valid {
                "valid".green()
            } else {
                "invalid".red().bold()
            };
            println!("  Registration: {}", validity);
            if let Some(ref label) = status.status_label {
                if status.closed {
                    println!("  Status: {}", label.as_str().red());
                } else {
                    println!("  Status: {}", label);
                }
            }
            if let Some(ref tax_type) = status.tax_type {
                println!("  Tax type: {}", tax_type.bright_black());
            }
        }
        None => {
            println!("  Registration: {}", "not checked".bright_black());
        }
    }

    println!();
}
