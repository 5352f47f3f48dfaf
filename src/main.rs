use abhyas::{Catalog, Config, JumpOutcome, Tracker};
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "abhyas")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall and per-subject progress
    Status,
    /// List topics and class states for a subject
    Topics {
        /// Subject to list (defaults to the first in the catalog)
        subject: Option<String>,
        /// Subdivision to list, for subjects that have them
        #[arg(long)]
        subdivision: Option<String>,
    },
    /// Mark a class as completed
    Mark {
        /// Subject name
        subject: String,
        /// Topic name
        topic: String,
        /// 1-based class index
        class: u32,
    },
    /// Revert a completed class (requires the admin secret)
    Unmark {
        /// Subject name
        subject: String,
        /// Topic name
        topic: String,
        /// 1-based class index
        class: u32,
        /// Admin secret from config.json
        #[arg(long)]
        secret: String,
    },
    /// Show the next topic with pending classes
    Next,
    /// Show today's completion count
    Today,
    /// Clear all progress and metadata (requires the admin secret)
    Reset {
        /// Admin secret from config.json
        #[arg(long)]
        secret: String,
        /// Confirm the irreversible wipe
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abhyas=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin().clone(),
    };
    let mut tracker = Tracker::open(catalog, config.admin_secret.clone(), Config::data_dir()?)?;

    match cli.command {
        Commands::Status => print_status(&tracker),
        Commands::Topics { subject, subdivision } => {
            if let Some(name) = subject {
                tracker.select_subject(&name)?;
            }
            if let Some(name) = subdivision {
                tracker.select_subdivision(&name)?;
            }
            print_topics(&tracker);
        }
        Commands::Mark { subject, topic, class } => {
            let change = tracker.set_class_state(&subject, &topic, class, true)?;
            if change.changed {
                println!("Marked {subject} / {topic} class {class} as completed.");
                let stats = tracker.topic_stats(&subject, &topic)?;
                println!("{topic}: {}/{} done.", stats.completed, stats.total);
            } else {
                println!("{subject} / {topic} class {class} was already completed.");
            }
            warn_if_unsaved(change.persist_warning);
        }
        Commands::Unmark { subject, topic, class, secret } => {
            tracker.attempt_unlock(&secret)?;
            tracker.toggle_edit()?;
            let change = tracker.set_class_state(&subject, &topic, class, false)?;
            if change.changed {
                println!("Reverted {subject} / {topic} class {class} to pending.");
            } else {
                println!("{subject} / {topic} class {class} was not completed.");
            }
            warn_if_unsaved(change.persist_warning);
        }
        Commands::Next => match tracker.jump_to_next_incomplete()? {
            JumpOutcome::Moved(target) => {
                match &target.subdivision {
                    Some(sub) => println!("Next up: {} / {} / {}", target.subject, sub, target.topic),
                    None => println!("Next up: {} / {}", target.subject, target.topic),
                }
                print_topics(&tracker);
            }
            JumpOutcome::AllDone => println!("All topics are completed. Great job!"),
        },
        Commands::Today => {
            println!("Today completed: {} classes", tracker.today_count());
        }
        Commands::Reset { secret, yes } => {
            if !yes {
                bail!("Reset wipes all progress and cannot be undone. Re-run with --yes to confirm");
            }
            tracker.attempt_unlock(&secret)?;
            let warning = tracker.reset()?;
            println!("All progress cleared.");
            warn_if_unsaved(warning);
        }
    }

    Ok(())
}

fn warn_if_unsaved(warning: Option<String>) {
    if let Some(warning) = warning {
        eprintln!("warning: {warning}");
    }
}

fn print_status(tracker: &Tracker) {
    let global = tracker.global_stats();
    println!(
        "Overall: {}/{} classes ({}%)",
        global.completed_classes, global.total_classes, global.percent
    );
    println!("Today completed: {} classes", tracker.today_count());

    if let Some(last) = tracker.last_studied() {
        match &last.subdivision {
            Some(sub) => println!("Last studied: {} / {} / {}", last.subject, sub, last.topic),
            None => println!("Last studied: {} / {}", last.subject, last.topic),
        }
    }

    println!();
    for subject in tracker.catalog().subjects() {
        let Ok(stats) = tracker.subject_stats(&subject.name) else {
            continue;
        };
        println!(
            "{} {}: {}/{} topics, {}/{} classes ({}%)",
            subject.icon,
            subject.name,
            stats.completed_topics,
            stats.total_topics,
            stats.completed_classes,
            stats.total_classes,
            stats.percent
        );
    }
}

fn print_topics(tracker: &Tracker) {
    let selection = tracker.selection();
    match &selection.current_subdivision {
        Some(sub) => println!("{} / {}", selection.current_subject, sub),
        None => println!("{}", selection.current_subject),
    }

    for topic in selection.topics_in_view(tracker.catalog()) {
        let count = tracker
            .completion_count(&selection.current_subject, &topic.name)
            .unwrap_or(0);
        let done = if count == topic.class_count { " ✓" } else { "" };
        println!("  {}: {}/{} done{}", topic.name, count, topic.class_count, done);

        for index in 1..=topic.class_count {
            let date = tracker
                .completion_date(&selection.current_subject, &topic.name, index)
                .unwrap_or(None);
            match date {
                Some(date) => println!("    [x] Class {index}  (completed on {date})"),
                None => println!("    [ ] Class {index}"),
            }
        }
    }
}
