use clap::{Parser, Subcommand};
use hugo_scribe::config::{self, AppConfig, ConfigStore, FileConfigStore};
use hugo_scribe::llm::ChatCompletionsClient;
use hugo_scribe::output::{self, Response};
use hugo_scribe::pipeline::{Pipeline, PipelineError, SystemClock};
use hugo_scribe::prompt::{BlogType, Voice};
use hugo_scribe::types::{GenerationRequest, Polish, SaveRequest, Style, Taxonomy};
use hugo_scribe::{assist, library, site};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Post type and voice.
#[derive(clap::Args, Clone)]
struct StyleArgs {
    /// instructional, personable, story, informative or persuasive
    #[arg(long = "type", default_value = "informative")]
    blog_type: String,

    /// inspirational, serious, casual, humorous or empathetic
    #[arg(long, default_value = "casual")]
    voice: String,
}

impl StyleArgs {
    fn style(&self) -> Style {
        Style::new(BlogType::parse(&self.blog_type), Voice::parse(&self.voice))
    }
}

/// Front-matter lists; each replaces the configured default when given.
#[derive(clap::Args, Clone)]
struct TaxonomyArgs {
    #[arg(long, value_delimiter = ',')]
    series: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl TaxonomyArgs {
    fn taxonomy(&self) -> Taxonomy {
        Taxonomy {
            series: clean(&self.series),
            categories: clean(&self.categories),
            tags: clean(&self.tags),
        }
    }
}

/// Fields shared by every command that writes a post.
#[derive(clap::Args, Clone)]
struct PostArgs {
    /// Post description
    #[arg(long, default_value = "")]
    description: String,

    /// Image alt text (defaults to the title)
    #[arg(long)]
    alt_text: Option<String>,

    /// Staged image, as a path or a name inside staging_dir
    #[arg(long)]
    image: Option<PathBuf>,

    #[command(flatten)]
    taxonomy: TaxonomyArgs,

    /// Restructure the text for the chosen type and voice
    #[arg(long)]
    format: bool,

    /// Run a spelling and grammar pass last
    #[arg(long)]
    correct: bool,
}

impl PostArgs {
    fn polish(&self, style: Style) -> Polish {
        Polish {
            reformat: self.format.then_some(style),
            correct: self.correct,
        }
    }
}

#[derive(Parser)]
#[command(name = "hugo-scribe")]
#[command(about = "Draft, polish and publish Hugo blog posts with a language model")]
#[command(long_about = "\
Draft, polish and publish Hugo blog posts with a language model

Every post is written to <hugo_path>/<slug>-<millis>/index.md with a copy in
<blogs_dir>, alongside its featured image if one was given:

  site/content/posts/
  └── home-composting-1760000000123/
      ├── index.md                 # front matter + markdown body
      └── home-composting.jpg      # named after the first four title words

Pipeline:
  generate   topic → draft → [format] → [correct] → front matter → disk
  save       text  →         [format] → [correct] → front matter → disk

Logs go to stderr; set RUST_LOG=hugo_scribe=debug for more detail.

Run 'hugo-scribe gen-config' to generate a documented settings.toml.")]
#[command(version)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = "settings.toml", global = true)]
    config: PathBuf,

    /// Print one JSON response instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a new post about a topic
    Generate {
        /// Topic; also the post title
        topic: String,

        #[command(flatten)]
        style: StyleArgs,

        /// Extra instructions appended to the prompt
        #[arg(long, default_value = "")]
        instructions: String,

        #[command(flatten)]
        post: PostArgs,

        /// Print the assembled post without saving it
        #[arg(long)]
        dry_run: bool,
    },
    /// Save existing text as a post
    Save {
        #[arg(long)]
        title: String,

        /// Markdown body to save
        #[arg(long)]
        content_file: PathBuf,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        post: PostArgs,
    },
    /// Restructure a markdown file and print the result
    Format {
        file: PathBuf,

        #[command(flatten)]
        style: StyleArgs,
    },
    /// Fix spelling and grammar in a file and print the result
    Correct { file: PathBuf },
    /// Suggest five titles for a topic
    Titles { topic: String },
    /// Test the API credential and the Hugo site
    Check,
    /// Run `hugo` once in the site root
    Build,
    /// List saved posts in blogs_dir, newest first
    List,
    /// Write a default settings file if none exists
    Init,
    /// Print a stock settings.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hugo_scribe=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let store = FileConfigStore::new(&cli.config);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Init => {
            if store.exists() {
                report(
                    cli.json,
                    Response::failure(format!("{} already exists", store.path().display())),
                );
            } else {
                store.save(&AppConfig::default())?;
                let message = format!("Wrote {}", store.path().display());
                if cli.json {
                    println!("{}", Response::ok(message, &store.path()).to_json());
                } else {
                    println!("{}", message);
                }
            }
        }
        Command::Generate {
            topic,
            style,
            instructions,
            post,
            dry_run,
        } => {
            let config = store.load()?;
            let client = client_for(&config);
            let pipeline = Pipeline::new(&client, &config, &SystemClock);
            let style = style.style();
            let request = GenerationRequest {
                topic: topic.trim().to_string(),
                style,
                instructions,
                description: post.description.clone(),
                alt_text: post.alt_text.clone(),
                image: post.image.clone(),
                taxonomy: post.taxonomy.taxonomy(),
                polish: post.polish(style),
            };
            if dry_run {
                let result = pipeline.draft(&request);
                finish(cli.json, &result, "Blog generated", output::print_document);
            } else {
                let result = pipeline.generate(&request);
                finish(cli.json, &result, "Blog generated and saved successfully!", |saved| {
                    output::print_saved_post(&request.topic, saved)
                });
            }
        }
        Command::Save {
            title,
            content_file,
            style,
            post,
        } => {
            let config = store.load()?;
            let client = client_for(&config);
            let content = std::fs::read_to_string(&content_file)?;
            let style = style.style();
            let request = SaveRequest {
                title: title.trim().to_string(),
                description: post.description.clone(),
                content,
                alt_text: post.alt_text.clone(),
                image: post.image.clone(),
                taxonomy: post.taxonomy.taxonomy(),
                polish: post.polish(style),
            };
            let result = Pipeline::new(&client, &config, &SystemClock).save(&request);
            finish(cli.json, &result, "Blog saved successfully!", |saved| {
                output::print_saved_post(&request.title, saved)
            });
        }
        Command::Format { file, style } => {
            let config = store.load()?;
            let client = client_for(&config);
            let text = std::fs::read_to_string(&file)?;
            let style = style.style();
            let result = assist::reformat(&client, &text, style.blog_type, style.voice)
                .map_err(PipelineError::from);
            finish(cli.json, &result, "Content formatted", |text| println!("{}", text));
        }
        Command::Correct { file } => {
            let config = store.load()?;
            let client = client_for(&config);
            let text = std::fs::read_to_string(&file)?;
            let result = assist::correct(&client, &text).map_err(PipelineError::from);
            finish(cli.json, &result, "Spelling and grammar corrected", |text| {
                println!("{}", text)
            });
        }
        Command::Titles { topic } => {
            let config = store.load()?;
            let client = client_for(&config);
            let result = if topic.trim().is_empty() {
                Err(PipelineError::Validation("Please enter a blog topic".into()))
            } else {
                assist::suggest_titles(&client, topic.trim()).map_err(PipelineError::from)
            };
            finish(cli.json, &result, "Titles generated", |titles| {
                output::print_titles(titles)
            });
        }
        Command::Check => {
            let config = store.load()?;
            let client = client_for(&config);
            let probe = assist::probe(&client);
            let site_check = site::check_site(&config);
            let success = probe.is_ok() && site_check.ok();
            if cli.json {
                let message = output::format_check(&probe, &site_check).join("\n");
                let response = if success {
                    Response::ok(message, &site_check)
                } else {
                    Response::failure(message)
                };
                println!("{}", response.to_json());
            } else {
                output::print_check(&probe, &site_check);
            }
            if !success {
                std::process::exit(1);
            }
        }
        Command::Build => {
            let config = store.load()?;
            match site::build_site(&config) {
                Ok(build) => {
                    let message = "Hugo site built successfully.";
                    if cli.json {
                        println!("{}", Response::ok(message, &build.stdout).to_json());
                    } else {
                        print!("{}", build.stdout);
                        println!("{}", message);
                    }
                }
                Err(err) => report(cli.json, Response::failure(err.to_string())),
            }
        }
        Command::List => {
            let config = store.load()?;
            let posts = library::list_posts(Path::new(&config.blogs_dir));
            if cli.json {
                let message = format!("{} saved posts", posts.len());
                println!("{}", Response::ok(message, &posts).to_json());
            } else {
                output::print_posts(&posts);
            }
        }
    }

    Ok(())
}

fn client_for(config: &AppConfig) -> ChatCompletionsClient {
    ChatCompletionsClient::new(&config.api.base_url, &config.api.model, &config.api.api_key)
}

/// Drop blank entries left by stray commas.
fn clean(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Print a pipeline result and exit non-zero on failure.
fn finish<T: serde::Serialize>(
    json: bool,
    result: &Result<T, PipelineError>,
    message: &str,
    print: impl FnOnce(&T),
) {
    match (json, result) {
        (true, _) => {
            println!("{}", Response::from_result(result, message).to_json());
            if result.is_err() {
                std::process::exit(1);
            }
        }
        (false, Ok(value)) => print(value),
        (false, Err(err)) => report(false, Response::from_error(err)),
    }
}

/// Print a failure and exit with status 1.
fn report(json: bool, response: Response) -> ! {
    if json {
        println!("{}", response.to_json());
    } else {
        eprintln!("error: {}", response.message);
    }
    std::process::exit(1);
}
