use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "harvest-page")]
#[command(about = "Batch scraper that normalizes pages and detects pagination with an LLM")]
#[command(version)]
pub struct Args {
    /// URL(s) to scrape, separated by whitespace
    pub urls: String,

    /// Model used for pagination inference
    #[arg(short, long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Free-text guidance for the pagination inference prompt
    #[arg(long)]
    pub hint: Option<String>,

    /// Directory that per-run output folders are created under
    #[arg(long, default_value = "output")]
    pub output_dir: String,

    /// URL for the WebDriver instance
    #[arg(long, default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Base URL of the OpenAI-compatible chat completions API
    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub api_base: String,

    /// API key for the inference backend (falls back to OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// List the models with pricing entries and exit
    #[arg(long)]
    pub list_models: bool,
}
