use bookshelf::repository::Repository;
use bookshelf::stats::Tally;
use bookshelf::{Book, Config, Format, LibraryError, LibraryStore};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tracing::{Level, info};

const BAR_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Bookshelf - record, search and tally the books you own")]
#[command(version)]
struct Cli {
    /// Library file (default: from config, else ./library.json)
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    /// Library file format: json, jsonl or csv (default: from file extension)
    #[arg(short, long, global = true)]
    format: Option<Format>,

    /// Config file (default: <config dir>/bookshelf/bookshelf.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the library
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        /// Publication year
        #[arg(long)]
        year: String,

        /// e.g. Fiction, Non-Fiction, Mystery, Sci-Fi, Fantasy, Biography, Other
        #[arg(long, default_value = "Other")]
        genre: String,

        /// e.g. Read/Unread or ToRead/Reading/Finished
        #[arg(long, default_value = "Unread")]
        status: String,
    },

    /// List every book in the order it was added
    List,

    /// Search books by substring, ignoring case
    Search {
        /// Text to look for (empty matches everything)
        #[arg(default_value = "")]
        term: String,

        /// Field to search: title, author, genre or any
        #[arg(short, long, default_value = "title")]
        by: String,
    },

    /// Show library statistics
    Stats {
        /// Number of top authors to show (default: from config)
        #[arg(short, long)]
        top: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(library) = cli.library {
        config.library = library;
    }
    if let Some(format) = cli.format {
        config.format = Some(format);
    }

    // Setup tracing; stdout is reserved for command output
    let level = match cli.verbose {
        0 => config.log_level()?,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Open store
    let repo = config.repository();
    info!(library = ?repo.path(), format = %repo.format(), "Opening library");
    let mut store = LibraryStore::open(repo);

    match cli.command {
        Commands::Add {
            title,
            author,
            year,
            genre,
            status,
        } => add_book(&mut store, &title, &author, &year, &genre, &status),
        Commands::List => {
            list_books(store.list());
            Ok(())
        }
        Commands::Search { term, by } => search_books(&store, &term, &by),
        Commands::Stats { top } => {
            show_stats(&store, top.unwrap_or(config.top_authors));
            Ok(())
        }
    }
}

fn add_book<R: Repository>(
    store: &mut LibraryStore<R>,
    title: &str,
    author: &str,
    year: &str,
    genre: &str,
    status: &str,
) -> Result<()> {
    match store.add(title, author, year, genre, status) {
        Ok(book) => {
            println!("{} '{}' added to your library", "✓".green(), book.title);
            Ok(())
        }
        Err(LibraryError::Persistence(e)) => {
            // The book is still in this session's collection, only the file is behind
            println!("{} '{}' added to your library", "✓".green(), title);
            eprintln!("{} {:#}", "warning:".yellow().bold(), e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn list_books(books: &[Book]) {
    if books.is_empty() {
        println!("Your library is empty. Add some books!");
        return;
    }

    for book in books {
        println!("{}", format_book(book));
    }
}

fn search_books<R: Repository>(store: &LibraryStore<R>, term: &str, by: &str) -> Result<()> {
    let results = store.search(term, by)?;

    if results.is_empty() {
        println!("No matching books found.");
        return Ok(());
    }

    for book in results {
        println!("{}", format_book(book));
    }
    Ok(())
}

fn show_stats<R: Repository>(store: &LibraryStore<R>, top_authors: usize) {
    if store.is_empty() {
        println!("Add books to see your library stats!");
        return;
    }

    let stats = store.stats(top_authors);

    println!("{}", "Library Statistics".bold().underline());
    println!("  Total books:  {}", stats.total.to_string().bold());
    println!("  Books read:   {}", stats.read.to_string().green());
    println!("  Unread books: {}", stats.unread.to_string().yellow());

    println!("\n{}", "Books by Genre".bold());
    print_bars(stats.genres.iter());

    println!("\n{}", "Top Authors".bold());
    print_bars(stats.top_authors.iter().map(|(k, v)| (k.as_str(), *v)));

    println!("\n{}", "Books by Decade".bold());
    if stats.decades.is_empty() {
        println!("  (no numeric publication years)");
    } else {
        print_bars(sorted_decades(&stats.decades).into_iter());
    }
}

/// Decades in chronological order for display
fn sorted_decades(decades: &Tally) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = decades.iter().collect();
    entries.sort_by_key(|(label, _)| label.trim_end_matches('s').parse::<i64>().unwrap_or(i64::MAX));
    entries
}

fn print_bars<'a>(entries: impl Iterator<Item = (&'a str, usize)>) {
    let entries: Vec<(&str, usize)> = entries.collect();
    let max = entries.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let label_width = entries.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);

    for (label, count) in entries {
        println!(
            "  {:<width$} {} {}",
            label,
            "█".repeat(bar_len(count, max)).cyan(),
            count,
            width = label_width
        );
    }
}

/// Bar length scaled so the largest count fills `BAR_WIDTH`; any non-zero count shows
fn bar_len(count: usize, max: usize) -> usize {
    if max == 0 { 0 } else { (count * BAR_WIDTH).div_ceil(max) }
}

fn format_book(book: &Book) -> String {
    format!(
        "{} by {} ({}) | Genre: {} | Status: {}",
        book.title.bold(),
        book.author.italic(),
        book.year,
        book.genre,
        book.status.bold()
    )
}
