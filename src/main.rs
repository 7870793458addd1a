use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

use jadwal::api::ApiClient;
use jadwal::config::{Backend, Config};
use jadwal::roster::{Assignment, AssignmentController, AssignmentStore, RestStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "jadwal")]
#[command(about = "Manage lecturer/course section assignments")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./jadwal.yaml or $XDG_CONFIG_HOME/jadwal/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every assignment
  List,
  /// Assign a lecturer to a course; the class label is picked automatically
  Add {
    #[arg(long)]
    dosen: i64,
    #[arg(long)]
    mk: i64,
  },
  /// Remove a lecturer from a course
  Remove {
    #[arg(long)]
    dosen: i64,
    #[arg(long)]
    mk: i64,
  },
  /// Lecturers with the sections they teach (database backend only)
  Lecturers,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = jadwal::logging::init(config.log_file.as_deref())?;

  match config.backend {
    Backend::Rest => {
      let api = ApiClient::new(&config.api)?;
      let store = RestStore::new(api, config.api.endpoints.clone());
      run(AssignmentController::new(store), args.command).await
    }
    Backend::Database => {
      let store = SqliteStore::open(&config.database.resolved_path()?)?;
      if let Command::Lecturers = args.command {
        for load in store.lecturers()? {
          let sections: Vec<String> = load
            .sections
            .iter()
            .map(|s| format!("{} ({})", s.nama_mk_genap, s.kelas))
            .collect();
          println!("{:>4}  {}  {}", load.id_dosen, load.nama_dosen, sections.join(", "));
        }
        return Ok(());
      }
      run(AssignmentController::new(store), args.command).await
    }
  }
}

async fn run<S: AssignmentStore>(controller: AssignmentController<S>, command: Command) -> Result<()> {
  match command {
    Command::List => {
      controller.fetch_all().await?;
      print_assignments(&controller.assignments());
    }
    Command::Add { dosen, mk } => {
      let added = controller.add(dosen, mk).await?;
      println!(
        "Assigned lecturer {} to course {} as class {}",
        added.id_dosen, added.id_mk_genap, added.kelas
      );
    }
    Command::Remove { dosen, mk } => {
      controller.remove(dosen, mk).await?;
      println!("Removed lecturer {} from course {}", dosen, mk);
    }
    Command::Lecturers => {
      return Err(eyre!(
        "The lecturers view needs the database backend (set backend: database)"
      ));
    }
  }

  Ok(())
}

fn print_assignments(assignments: &[Assignment]) {
  if assignments.is_empty() {
    println!("No assignments");
    return;
  }

  println!("{:>8}  {:>8}  {}", "DOSEN", "MK", "KELAS");
  for a in assignments {
    println!("{:>8}  {:>8}  {}", a.id_dosen, a.id_mk_genap, a.kelas);
  }
}
