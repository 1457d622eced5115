use anyhow::{Context, Result};
use clap::Parser;
use phishwatch::analyze::Analyzer;
use phishwatch::analyze::script::scan_script;
use phishwatch::monitor::PageMonitor;
use phishwatch::page::snapshot::page_from_html;
use phishwatch::reputation::{
    CertificateProvider, DnsBlacklistProvider, NtsRegistry, SafeBrowsingProvider, SurblProvider,
    UrlHausProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "phishwatch")]
#[command(about = "Analyze web pages for phishing and malicious client-side behavior")]
struct Args {
    /// HTML file (or JavaScript file with --script) to analyze
    input: String,

    /// Treat the input file as a standalone script instead of a page
    #[arg(long)]
    script: bool,

    /// Page URL, used for domain reputation and origin comparisons
    #[arg(long, default_value = "https://localhost/")]
    url: String,

    /// Business registration number to validate (extracted from the page
    /// when omitted)
    #[arg(long)]
    business_number: Option<String>,

    /// Run the online reputation and registry checks
    #[arg(long)]
    online: bool,

    /// Emit the report as JSON instead of the terminal view
    #[arg(long)]
    json: bool,

    /// Keep monitoring the page on an interval after the initial pass
    #[arg(long)]
    watch: bool,

    /// Monitoring interval in seconds
    #[arg(long, default_value_t = 5)]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input))?;

    if args.script {
        let snapshot = scan_script(&content);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            for issue in &snapshot.issues {
                let location = issue.location.as_deref().unwrap_or("-");
                println!(
                    "[{}] {} ({}) {}",
                    issue.severity.as_str(),
                    issue.category.as_str(),
                    location,
                    issue.description
                );
            }
            if snapshot.issues.is_empty() {
                println!("No issues found");
            }
        }
        return Ok(());
    }

    let hostname = url::Url::parse(&args.url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .context("URL has no host")?;
    let page = page_from_html(&hostname, &content);

    let mut analyzer = Analyzer::new();
    if args.online {
        analyzer = analyzer
            .with_provider(Box::new(UrlHausProvider::new()))
            .with_provider(Box::new(SafeBrowsingProvider::new()))
            .with_provider(Box::new(DnsBlacklistProvider::new()))
            .with_provider(Box::new(SurblProvider::new()))
            .with_provider(Box::new(CertificateProvider::new()));
        if let Some(registry) = NtsRegistry::from_env() {
            analyzer = analyzer.with_registry(Box::new(registry));
        } else {
            tracing::warn!("NTS_SERVICE_KEY not set, skipping business registry checks");
        }
    }

    let report = analyzer
        .analyze_page(&args.url, page.as_ref(), args.business_number.as_deref())
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        phishwatch::output::print_report(&report);
    }

    if args.watch {
        let watched: Arc<dyn phishwatch::page::PageAccessor> = page.clone();
        let monitor =
            PageMonitor::with_interval(watched, Duration::from_secs(args.interval.max(1)));
        monitor.start(|issues| {
            for issue in issues {
                let location = issue.location.as_deref().unwrap_or("-");
                println!(
                    "[{}] {} ({}) {}",
                    issue.severity.as_str(),
                    issue.category.as_str(),
                    location,
                    issue.description
                );
            }
        });

        tokio::signal::ctrl_c().await?;
        monitor.stop();
    }

    Ok(())
}
