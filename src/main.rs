use clap::Parser;
use harvest_page::config::{OrchestratorConfig, ScrapeRequest};
use harvest_page::fetchers::WebDriverFetcher;
use harvest_page::orchestrator::Orchestrator;
use harvest_page::paginate::LlmPaginationInferrer;
use harvest_page::pricing;
use harvest_page::results::UrlOutcome;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if args.list_models {
        for model in pricing::known_models() {
            println!("{}", model);
        }
        return;
    }

    let request = ScrapeRequest::from_batch(&args.urls, &args.model, args.hint.clone());

    // The API key can come from the environment as well as the flag
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();

    println!("Note: page fetching requires a WebDriver server (e.g., ChromeDriver).");
    println!("Pass --webdriver-url if not using the default http://localhost:4444");

    ::log::info!("Launching scraper for {} URL(s)", request.urls.len());

    let config = OrchestratorConfig {
        output_root: args.output_dir.clone().into(),
        webdriver_url: args.webdriver_url.clone(),
        api_base: args.api_base.clone(),
    };

    let fetcher = WebDriverFetcher::new(&config.webdriver_url);
    let inferrer = LlmPaginationInferrer::new(&config.api_base, &api_key);
    let mut orchestrator = Orchestrator::new(config, Box::new(fetcher), Box::new(inferrer));

    let result = match orchestrator.run(&request).await {
        Ok(result) => result,
        Err(e) => {
            ::log::error!("Run rejected: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Display pagination URLs for each URL
    for outcome in &result.outcomes {
        match outcome {
            UrlOutcome::Scraped(entry) => {
                println!("### Pagination URLs detected for URL: {}", entry.url);
                let quoted: Vec<String> = entry
                    .page_urls
                    .iter()
                    .map(|u| format!("\"{}\"", u))
                    .collect();
                println!("PRODUCT_URLS = [{}]", quoted.join(", "));
            }
            UrlOutcome::Failed(failure) => {
                println!(
                    "### URL {} failed at the {} stage: {}",
                    failure.url, failure.stage, failure.message
                );
            }
        }
    }

    println!(
        "Totals: {} input tokens, {} output tokens, ${:.6}",
        result.total_input_tokens, result.total_output_tokens, result.total_cost
    );

    if result.failure_count() > 0 {
        std::process::exit(2);
    }
}
