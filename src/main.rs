//! wikisnip CLI - Wikipedia and Wiktionary lookups for chat
//!
//! The lookup logic is contained in lib.rs; this file maps the chat commands
//! onto subcommands and prints the reply lines.

use clap::{Parser, Subcommand};
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wikisnip::config::is_valid_lang;
use wikisnip::links::{find_link, LinkTarget};
use wikisnip::output::{page_name, page_url, section_reply, snippet_reply, Reply};
use wikisnip::storage::{is_channel, Scope};
use wikisnip::wiktionary::{format_etymology, render_definitions};
use wikisnip::{
    extract_html, segment_page, Config, FetchError, LangStore, MediaWiki, Wiktionary,
};

const WIKIPEDIA_PREFIX: &str = "[wikipedia] ";
const WIKTIONARY_PREFIX: &str = "[wiktionary] ";

lazy_static! {
    static ref LANG_PREFIX: Regex =
        Regex::new(r"^-([a-z]{2,12})\s(.*)").expect("invalid language prefix regex");
}

#[derive(Parser)]
#[command(name = "wikisnip")]
#[command(author, version, about = "Wikipedia and Wiktionary snippets for chat", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Wikipedia and show the intro of the best match
    #[command(visible_alias = "wikipedia")]
    Wp {
        /// Wikipedia language, e.g. "de"
        #[arg(long)]
        lang: Option<String>,
        /// Nick asking, for their language preference
        #[arg(long)]
        nick: Option<String>,
        /// Channel asked in, for its language preference
        #[arg(long)]
        channel: Option<String>,
        /// Search terms; a leading "-de" picks the language
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Describe a Wikipedia link found in a message
    Link {
        /// Message text containing the link
        text: Vec<String>,
    },
    /// Look up a word's definitions on Wiktionary
    #[command(visible_aliases = ["define", "dict"])]
    Wt { word: Vec<String> },
    /// Look up a word's etymology on Wiktionary
    Ety { word: Vec<String> },
    /// Show or set a nick's Wikipedia language
    Wplang { nick: String, lang: Option<String> },
    /// Show or set a channel's Wikipedia language
    Wpclang { channel: String, lang: Option<String> },
    /// Extract the content of a local HTML file
    Extract {
        file: PathBuf,
        /// Page or section title echoed in headings
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Segment a saved Wiktionary page and print it as JSON
    Segment { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let max_len = config.output.max_length;

    match cli.command {
        Commands::Wp {
            lang,
            nick,
            channel,
            query,
        } => {
            let query = query.join(" ");
            let (prefix_lang, query) = split_lang_prefix(&query);
            if query.trim().is_empty() {
                reply("What do you want me to look up?");
                return Ok(());
            }
            if query.starts_with("Special:") {
                reply("Sorry, the MediaWiki API doesn't support querying the Special: namespace.");
                return Ok(());
            }

            let lang = match lang.or(prefix_lang) {
                Some(lang) => lang,
                None => open_store(&config)?.choose_lang(
                    nick.as_deref(),
                    channel.as_deref(),
                    &config.wikipedia.default_lang,
                )?,
            };
            if !is_valid_lang(&lang) {
                reply(&format!("Unknown Wikipedia language: {lang}"));
                return Ok(());
            }

            let wiki = MediaWiki::wikipedia(&lang, &config.http)?;
            let Some(title) = wiki.search(query, 1).await?.into_iter().next() else {
                reply("I can't find any results for that.");
                return Ok(());
            };
            say_snippet(&wiki, &title, true, max_len).await?;
        }
        Commands::Link { text } => {
            let text = text.join(" ");
            // Our own output carries the page URL; don't answer it.
            if text.starts_with(WIKIPEDIA_PREFIX) {
                return Ok(());
            }
            let Some(link) = find_link(&text) else {
                return Ok(());
            };

            let wiki = MediaWiki::new(link.server.as_str(), &config.http)?;
            match link.target {
                LinkTarget::Article | LinkTarget::Citation => {
                    say_snippet(&wiki, &link.article, false, max_len).await?;
                }
                LinkTarget::Section(anchor) => match wiki.section(&link.article, &anchor).await? {
                    Some(text) if !text.is_empty() => {
                        let line = section_reply(&link.article, &anchor, &text).render(max_len);
                        say(WIKIPEDIA_PREFIX, &line);
                    }
                    _ => say(
                        WIKIPEDIA_PREFIX,
                        &format!(
                            "Error fetching section \"{anchor}\" for page \"{}\".",
                            page_name(&link.article)
                        ),
                    ),
                },
                LinkTarget::Media(image) => {
                    if let Some(description) = wiki.image_description(&image).await? {
                        if !description.is_empty() {
                            say(WIKIPEDIA_PREFIX, &Reply::new(description).render(max_len));
                        }
                    }
                }
            }
        }
        Commands::Wt { word } => {
            let word = word.join(" ");
            if word.is_empty() {
                reply("You must tell me what to look up!");
                return Ok(());
            }
            let wiktionary = Wiktionary::new(&config.http)?;
            let definitions = wiktionary.lookup_definitions(&word).await?;
            if definitions.is_empty() {
                reply(&format!("Couldn't get any definitions for {word}."));
                return Ok(());
            }
            let line = Reply::new(render_definitions(&word, &definitions)).render(max_len);
            say(WIKTIONARY_PREFIX, &line);
        }
        Commands::Ety { word } => {
            let word = word.join(" ");
            if word.is_empty() {
                reply("You must give me a word!");
                return Ok(());
            }
            let wiktionary = Wiktionary::new(&config.http)?;
            match wiktionary.lookup_etymology(&word).await? {
                Some(etymology) => {
                    let line = Reply::new(format_etymology(&word, &etymology)).render(max_len);
                    say(WIKTIONARY_PREFIX, &line);
                }
                None => reply(&format!("Couldn't get the etymology for {word}.")),
            }
        }
        Commands::Wplang { nick, lang } => {
            let store = open_store(&config)?;
            match lang {
                Some(lang) => {
                    store.set(Scope::Nick(&nick), &lang)?;
                    reply(&format!("Set your Wikipedia language to: {lang}"));
                }
                None => {
                    let current = store
                        .get(Scope::Nick(&nick))?
                        .map_or_else(|| config.wikipedia.default_lang.clone(), |s| s.lang);
                    reply(&format!("Your current Wikipedia language is: {current}"));
                }
            }
        }
        Commands::Wpclang { channel, lang } => {
            if !is_channel(&channel) {
                reply("This command only works for channels.");
                return Ok(());
            }
            let store = open_store(&config)?;
            match lang {
                Some(lang) => {
                    store.set(Scope::Channel(&channel), &lang)?;
                    say(
                        WIKIPEDIA_PREFIX,
                        &format!("Set {channel}'s Wikipedia language to: {lang}"),
                    );
                }
                None => {
                    let current = store
                        .get(Scope::Channel(&channel))?
                        .map_or_else(|| config.wikipedia.default_lang.clone(), |s| s.lang);
                    say(
                        WIKIPEDIA_PREFIX,
                        &format!("{channel}'s current Wikipedia language is: {current}"),
                    );
                }
            }
        }
        Commands::Extract { file, title } => {
            let html = std::fs::read_to_string(&file)?;
            println!("{}", extract_html(&html, &title));
        }
        Commands::Segment { file } => {
            let html = std::fs::read_to_string(&file)?;
            let entry = segment_page(&html);
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }

    Ok(())
}

/// Print the intro of `title`, or a fetch error line when the API returned
/// an unexpected shape.
async fn say_snippet(
    wiki: &MediaWiki,
    title: &str,
    show_url: bool,
    max_len: usize,
) -> anyhow::Result<()> {
    match wiki.snippet(title).await {
        Ok(snippet) => {
            let url = show_url.then(|| page_url(wiki.server(), title));
            let line = snippet_reply(title, &snippet, url.as_deref()).render(max_len);
            say(WIKIPEDIA_PREFIX, &line);
        }
        Err(FetchError::MissingField(_)) => {
            reply(&format!("Error fetching snippet for \"{}\".", page_name(title)));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<LangStore> {
    Ok(LangStore::open(config.storage.path.join("preferences"))?)
}

/// Split a leading `-xx ` language selector off a query.
fn split_lang_prefix(query: &str) -> (Option<String>, &str) {
    match LANG_PREFIX.captures(query) {
        Some(caps) => {
            let lang = caps.get(1).map(|m| m.as_str().to_string());
            let rest = caps.get(2).map_or("", |m| m.as_str());
            (lang, rest)
        }
        None => (None, query),
    }
}

fn say(prefix: &str, line: &str) {
    println!("{}{}", prefix.bold(), line);
}

fn reply(message: &str) {
    println!("{}", message.yellow());
}
