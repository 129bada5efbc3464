use clap::{Parser, Subcommand};
use console::style;
use covers_config::{
    CoversConfig, get_config_value, load_config, open_in_editor, resolve_json_output,
    resolve_log_level, resolve_settings, set_config_value,
};
use covers_core::{CoverRelation, CoversError, CoversResult, RelationKind, ScrapeResult};
use covers_scraper::CoverScraper;
use tracing_subscriber::EnvFilter;

const CONFIG_KEYS: &[&str] = &[
    "solver.url",
    "solver.max_timeout_ms",
    "solver.call_timeout_secs",
    "site.origin",
    "fetch.max_attempts",
    "fetch.base_delay_ms",
    "output.json",
    "log.level",
];

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Open config file in editor
    Edit,
}

#[derive(Debug, Parser)]
#[command(name = "covers")]
#[command(version, about = "Cover song relationships for an artist", long_about = None)]
struct Cli {
    /// List songs by other artists covering ARTIST instead of songs ARTIST covered
    #[arg(long)]
    covered: bool,
    #[arg(long, default_value = covers_scraper::DEFAULT_PAGE)]
    page: String,
    /// Print the response envelope as JSON
    #[arg(long)]
    json: bool,
    #[arg(value_name = "ARTIST")]
    artist: Vec<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        if let Err(err) = handle_config_command(action) {
            exit_with(&err);
        }
        return;
    }

    let config = load_config().unwrap_or_else(|err| exit_with(&err));
    init_logging(&config);

    let kind = if cli.covered {
        RelationKind::CoveredByOthers
    } else {
        RelationKind::CoversBy
    };
    let artist = cli.artist.join(" ");
    let json = cli.json || resolve_json_output(&config).unwrap_or(false);

    match run_scrape(&config, &artist, kind, &cli.page).await {
        Ok(result) => {
            if let Err(err) = print_result(&result, json) {
                exit_with(&err);
            }
        }
        Err(err) => exit_with(&err),
    }
}

fn init_logging(config: &CoversConfig) {
    let fallback = resolve_log_level(config).unwrap_or_else(|| "warn".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_scrape(
    config: &CoversConfig,
    artist: &str,
    kind: RelationKind,
    page: &str,
) -> CoversResult<ScrapeResult> {
    let settings = resolve_settings(config)?;
    tracing::debug!(
        solver = %settings.solver_url,
        origin = %settings.site_origin,
        max_attempts = settings.max_attempts,
        "resolved settings"
    );
    let scraper = CoverScraper::from_settings(&settings)?;
    scraper.scrape(artist, kind, Some(page)).await
}

fn handle_config_command(action: ConfigAction) -> CoversResult<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config()?;
            match get_config_value(&config, &key) {
                Some(v) => println!("{key} = {v}"),
                None => println!("{key} = <null>"),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            if !CONFIG_KEYS.contains(&key.as_str()) {
                return Err(CoversError::Config(format!("unknown config key: {key}")));
            }
            set_config_value(&key, &value)?;
            println!("{} Set {key} = {value}", style("✓").green());
            Ok(())
        }
        ConfigAction::List => {
            let config = load_config()?;
            println!("Current configuration:");
            let mut section = "";
            for key in CONFIG_KEYS {
                let Some((head, field)) = key.split_once('.') else {
                    continue;
                };
                if head != section {
                    println!("\n[{head}]");
                    section = head;
                }
                let value = get_config_value(&config, key).unwrap_or_else(|| "<null>".to_string());
                println!("{field} = {value}");
            }
            Ok(())
        }
        ConfigAction::Edit => {
            open_in_editor()?;
            Ok(())
        }
    }
}

fn print_result(result: &ScrapeResult, json: bool) -> CoversResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(result)
            .map_err(|err| CoversError::Config(format!("failed to render json: {err}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let heading = match result.relation_kind {
        RelationKind::CoversBy => "Covers by",
        RelationKind::CoveredByOthers => "Covers of",
    };
    println!(
        "{} {}",
        style(heading).bold().cyan(),
        style(&result.subject_artist).bold()
    );

    for relation in &result.relations {
        println!("  {}", format_relation(relation, result.relation_kind));
    }

    let pagination = result.pagination;
    println!(
        "\n{} page {} of {}",
        style("Summary:").bold(),
        pagination.current_page,
        pagination.total_pages
    );
    if pagination.has_next() {
        println!(
            "  {} --page {}",
            style("next:").dim(),
            pagination.current_page + 1
        );
    }
    Ok(())
}

fn format_relation(relation: &CoverRelation, kind: RelationKind) -> String {
    let track = with_year(&relation.track.name, relation.track.year.as_deref());
    let cover = with_year(&relation.cover.name, relation.cover.year.as_deref());
    let artist = if relation.cover.artist.is_empty() {
        "Unknown artist"
    } else {
        relation.cover.artist.as_str()
    };
    match kind {
        RelationKind::CoversBy => format!("{track} {} {artist} - {cover}", style("covers").dim()),
        RelationKind::CoveredByOthers => {
            format!("{track} {} {artist} - {cover}", style("covered by").dim())
        }
    }
}

fn with_year(name: &str, year: Option<&str>) -> String {
    match year {
        Some(year) => format!("{name} ({year})"),
        None => name.to_string(),
    }
}

fn exit_with(err: &CoversError) -> ! {
    eprintln!(
        "{} {err} {}",
        style("Error:").red(),
        style(format!("[{}]", err.http_status())).dim()
    );
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use covers_core::{CoverInfo, TrackInfo};

    fn relation(cover_year: Option<&str>) -> CoverRelation {
        CoverRelation {
            track: TrackInfo {
                name: "Hurt".to_string(),
                year: Some("1994".to_string()),
                url: None,
                image_url: None,
            },
            cover: CoverInfo {
                name: "Hurt".to_string(),
                artist: "Johnny Cash".to_string(),
                artist_url: None,
                year: cover_year.map(str::to_string),
                url: None,
            },
        }
    }

    #[test]
    fn with_year_omits_missing_year() {
        assert_eq!(with_year("Hurt", Some("2002")), "Hurt (2002)");
        assert_eq!(with_year("Hurt", None), "Hurt");
    }

    #[test]
    fn covered_line_names_covering_artist() {
        console::set_colors_enabled(false);
        let line = format_relation(&relation(Some("2002")), RelationKind::CoveredByOthers);
        assert_eq!(line, "Hurt (1994) covered by Johnny Cash - Hurt (2002)");
    }

    #[test]
    fn covers_by_line_names_original_artist() {
        console::set_colors_enabled(false);
        let relation = CoverRelation {
            track: TrackInfo {
                name: "The Man Who Sold the World".to_string(),
                year: Some("1993".to_string()),
                url: None,
                image_url: None,
            },
            cover: CoverInfo {
                name: "The Man Who Sold the World".to_string(),
                artist: "David Bowie".to_string(),
                artist_url: Some("/David-Bowie/".to_string()),
                year: Some("1970".to_string()),
                url: None,
            },
        };
        let line = format_relation(&relation, RelationKind::CoversBy);
        assert_eq!(
            line,
            "The Man Who Sold the World (1993) covers David Bowie - The Man Who Sold the World (1970)"
        );
    }

    #[test]
    fn parses_multi_word_artist_and_flags() {
        let cli = Cli::parse_from(["covers", "--covered", "--page", "2", "Johnny", "Cash"]);
        assert!(cli.covered);
        assert_eq!(cli.page, "2");
        assert_eq!(cli.artist.join(" "), "Johnny Cash");
        assert!(cli.command.is_none());
    }

    #[test]
    fn config_keys_resolve_against_config() {
        let config = CoversConfig::default();
        for key in CONFIG_KEYS {
            assert_eq!(get_config_value(&config, key), None, "{key}");
        }
    }
}
