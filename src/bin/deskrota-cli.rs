#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use deskrota::{
    calendar,
    config::{self, EngineConfig},
    io,
    model::{
        HolidayInterval, Location, LocationId, ScheduleId, ScheduleStatus, ShiftId, ShiftStatus,
        Snapshot, TimeOffKind, TimeOffRequest, TimeOffStatus, WorkerId,
    },
    notification::{prepare_digests, TextDigest},
    scheduler::{GenerateRequest, Scheduler},
    storage::{JsonStorage, Storage, Workspace},
};
use std::fs;
use std::path::PathBuf;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification hebdomadaire multi-sites (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de travail
    #[arg(long, global = true, default_value = "workspace.json")]
    workspace: String,

    /// Réglages du moteur (JSON) ; valeurs par défaut sinon
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Écrire la configuration par défaut
    InitConfig {
        #[arg(long)]
        out: String,
    },

    /// Importer la matrice de disponibilités (CSV Name,Max_Hours,<Day>_<H>:00...)
    ImportAvailability {
        #[arg(long)]
        csv: String,
    },

    /// Importer des lieux depuis un CSV
    ImportLocations {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter un lieu
    AddLocation {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        min: u32,
        #[arg(long, default_value_t = 10)]
        max: u32,
        #[arg(long, default_value_t = 0)]
        priority: i32,
    },

    /// Ajouter une période fériée (bornes incluses, YYYY-MM-DD)
    AddHoliday {
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Ajouter une absence (approuvée par défaut)
    AddTimeOff {
        /// Identifiant ou nom de la personne
        #[arg(long)]
        worker: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        sick: bool,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Lister les demandes d'absence (avec leur index)
    ListTimeOff {
        /// pending | approved | denied
        #[arg(long)]
        status: Option<String>,
    },

    /// Statuer sur une demande d'absence en attente
    ReviewTimeOff {
        /// Index affiché par `list-time-off`
        #[arg(long)]
        index: usize,
        /// approve | deny
        #[arg(long)]
        decision: String,
    },

    /// Retirer une période fériée (par nom)
    RemoveHoliday {
        #[arg(long)]
        name: String,
    },

    /// Désactiver un lieu (exclu des générations suivantes)
    DeactivateLocation {
        /// Identifiant ou nom du lieu
        #[arg(long)]
        location: String,
    },

    /// Désactiver une personne (exclue des générations suivantes)
    DeactivateWorker {
        /// Identifiant ou nom de la personne
        #[arg(long)]
        worker: String,
    },

    /// Générer le planning brouillon d'une semaine
    Generate {
        /// Lundi de la semaine (YYYY-MM-DD)
        #[arg(long)]
        week: String,
        #[arg(long, default_value = "cli")]
        by: String,
        #[arg(long)]
        notes: Option<String>,
        /// Export CSV des alertes (optionnel)
        #[arg(long)]
        warnings_csv: Option<String>,
    },

    /// Lister les plannings
    List {
        /// draft | published | archived
        #[arg(long)]
        status: Option<String>,
    },

    /// Afficher un planning
    Show {
        #[arg(long)]
        schedule: String,
    },

    /// Publier un brouillon (archive le planning publié précédent)
    Publish {
        #[arg(long)]
        schedule: String,
    },

    /// Archiver un planning
    Archive {
        #[arg(long)]
        schedule: String,
    },

    /// Supprimer un planning non publié
    Delete {
        #[arg(long)]
        schedule: String,
    },

    /// Vérifier les invariants d'un planning
    Check {
        #[arg(long)]
        schedule: String,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Exporter un planning
    Export {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        csv: Option<String>,
        #[arg(long)]
        json: Option<String>,
        #[arg(long)]
        ics: Option<String>,
        #[arg(long, default_value = "IT Help Desk Schedule")]
        calendar_name: String,
    },

    /// Suivi d'un bloc d'un planning publié
    SetShiftStatus {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        shift: String,
        /// scheduled | completed | missed | swapped
        #[arg(long)]
        status: String,
    },

    /// Générer un récapitulatif texte par personne
    Notify {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        out_dir: String,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn resolve_worker(snapshot: &Snapshot, key: &str) -> Result<WorkerId> {
    snapshot
        .find_worker(&WorkerId::new(key))
        .or_else(|| snapshot.find_worker_by_name(key))
        .map(|w| w.id.clone())
        .ok_or_else(|| anyhow::anyhow!("unknown worker: {key}"))
}

fn resolve_location(snapshot: &Snapshot, key: &str) -> Result<LocationId> {
    snapshot
        .find_location(&LocationId::new(key))
        .or_else(|| snapshot.locations.iter().find(|l| l.name == key))
        .map(|l| l.id.clone())
        .ok_or_else(|| anyhow::anyhow!("unknown location: {key}"))
}

fn upsert_locations(snapshot: &mut Snapshot, locations: Vec<Location>) {
    for location in locations {
        snapshot.locations.retain(|l| l.id != location.id);
        snapshot.locations.push(location);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let engine_config = match &cli.config {
        Some(path) => config::load_config_from_file(path)?,
        None => EngineConfig::default(),
    };

    let storage = JsonStorage::open(&cli.workspace)?;
    let mut ws: Workspace = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::InitConfig { out } => {
            config::export_config_json(&out, &engine_config)?;
            0
        }
        Commands::ImportAvailability { csv } => {
            let (workers, windows) = io::import_availability_csv(csv)?;
            let snapshot = &mut ws.snapshot;
            for worker in &workers {
                snapshot.workers.retain(|w| w.id != worker.id);
                snapshot.availability.retain(|a| a.worker != worker.id);
            }
            println!("imported {} worker(s), {} window(s)", workers.len(), windows.len());
            snapshot.workers.extend(workers);
            snapshot.availability.extend(windows);
            storage.save(&ws)?;
            0
        }
        Commands::ImportLocations { csv } => {
            let locations = io::import_locations_csv(csv)?;
            upsert_locations(&mut ws.snapshot, locations);
            storage.save(&ws)?;
            0
        }
        Commands::AddLocation {
            name,
            min,
            max,
            priority,
        } => {
            if min > max {
                bail!("--min must not exceed --max");
            }
            let slug = io::slug(&name);
            if slug.is_empty() {
                bail!("invalid location name {name:?}: needs at least one letter or digit");
            }
            let id = LocationId::new(slug);
            let location = Location::new(name, min, max, priority).with_id(id);
            upsert_locations(&mut ws.snapshot, vec![location]);
            storage.save(&ws)?;
            0
        }
        Commands::AddHoliday { name, start, end } => {
            let holiday = HolidayInterval::new(name, parse_date(&start)?, parse_date(&end)?)
                .map_err(anyhow::Error::msg)?;
            ws.snapshot.holidays.push(holiday);
            storage.save(&ws)?;
            0
        }
        Commands::AddTimeOff {
            worker,
            start,
            end,
            pending,
            sick,
            reason,
        } => {
            let worker = resolve_worker(&ws.snapshot, &worker)?;
            let mut req = TimeOffRequest::approved(worker, parse_date(&start)?, parse_date(&end)?)
                .map_err(anyhow::Error::msg)?;
            if pending {
                req.status = TimeOffStatus::Pending;
            }
            if sick {
                req.kind = TimeOffKind::SickDay;
            }
            req.reason = reason;
            ws.snapshot.time_off.push(req);
            storage.save(&ws)?;
            0
        }
        Commands::ListTimeOff { status } => {
            let status: Option<TimeOffStatus> = status
                .map(|s| s.parse::<TimeOffStatus>().map_err(anyhow::Error::msg))
                .transpose()?;
            for (index, req) in ws.snapshot.time_off.iter().enumerate() {
                if status.is_some_and(|s| s != req.status) {
                    continue;
                }
                println!(
                    "{index} | {} | {} -> {} | {}",
                    ws.snapshot.worker_name(&req.worker),
                    req.start_date,
                    req.end_date,
                    req.status
                );
            }
            0
        }
        Commands::ReviewTimeOff { index, decision } => {
            let decision: TimeOffStatus = decision.parse().map_err(anyhow::Error::msg)?;
            let req = ws
                .snapshot
                .time_off
                .get_mut(index)
                .with_context(|| format!("no time-off request at index {index}"))?;
            req.review(decision).map_err(anyhow::Error::msg)?;
            println!("time-off {index} {decision}");
            storage.save(&ws)?;
            0
        }
        Commands::RemoveHoliday { name } => {
            if ws.snapshot.remove_holiday(&name) == 0 {
                bail!("unknown holiday: {name}");
            }
            storage.save(&ws)?;
            0
        }
        Commands::DeactivateLocation { location } => {
            let id = resolve_location(&ws.snapshot, &location)?;
            ws.snapshot.deactivate_location(&id).map_err(anyhow::Error::msg)?;
            storage.save(&ws)?;
            0
        }
        Commands::DeactivateWorker { worker } => {
            let id = resolve_worker(&ws.snapshot, &worker)?;
            ws.snapshot.deactivate_worker(&id).map_err(anyhow::Error::msg)?;
            storage.save(&ws)?;
            0
        }
        Commands::Generate {
            week,
            by,
            notes,
            warnings_csv,
        } => {
            let scheduler = Scheduler::new(engine_config)?;
            let mut request = GenerateRequest::new(parse_date(&week)?, by);
            if let Some(notes) = notes {
                request = request.with_notes(notes);
            }
            let generated = scheduler.generate(&ws.snapshot, request)?;

            if let Some(path) = warnings_csv {
                io::export_warnings_csv(path, &generated.warnings)?;
            }
            for w in &generated.warnings {
                eprintln!("warning: {} {} @ {}: {}", w.day, w.date, w.location, w.message);
            }
            println!(
                "{} | week {} | {} shift(s) | {} warning(s)",
                generated.schedule.id,
                generated.schedule.week_start,
                generated.schedule.shifts.len(),
                generated.warnings.len()
            );

            let id = generated.schedule.id.clone();
            ws.schedules.insert(generated.schedule);
            if !generated.warnings.is_empty() {
                ws.warnings.insert(id, generated.warnings);
            }
            storage.save(&ws)?;
            0
        }
        Commands::List { status } => {
            let status: Option<ScheduleStatus> = status
                .map(|s| s.parse::<ScheduleStatus>().map_err(anyhow::Error::msg))
                .transpose()?;
            for run in ws.schedules.list(status) {
                println!(
                    "{} | {} | {} | {} shift(s)",
                    run.id,
                    run.week_start,
                    run.status,
                    run.shifts.len()
                );
            }
            0
        }
        Commands::Show { schedule } => {
            let id = ScheduleId::new(schedule);
            let run = ws
                .schedules
                .find(&id)
                .with_context(|| format!("unknown schedule: {id}"))?;
            println!("{} | week {} | {}", run.id, run.week_start, run.status);
            for s in run.sorted_shifts() {
                println!(
                    "{} {} | {} | {} | {}",
                    s.day,
                    s.actual_date,
                    s.hours,
                    ws.snapshot.location_name(&s.location),
                    ws.snapshot.worker_name(&s.worker)
                );
            }
            for w in ws.warnings.get(&id).into_iter().flatten() {
                println!("! {} {} @ {}: {}", w.day, w.date, w.location, w.message);
            }
            0
        }
        Commands::Publish { schedule } => {
            let run = ws.schedules.publish(&ScheduleId::new(schedule))?;
            println!("published {} (week {})", run.id, run.week_start);
            storage.save(&ws)?;
            0
        }
        Commands::Archive { schedule } => {
            ws.schedules.archive(&ScheduleId::new(schedule))?;
            storage.save(&ws)?;
            0
        }
        Commands::Delete { schedule } => {
            let removed = ws.schedules.remove(&ScheduleId::new(schedule))?;
            ws.warnings.remove(&removed.id);
            storage.save(&ws)?;
            0
        }
        Commands::Check { schedule, report } => {
            let id = ScheduleId::new(schedule);
            let run = ws
                .schedules
                .find(&id)
                .with_context(|| format!("unknown schedule: {id}"))?;
            let scheduler = Scheduler::new(engine_config)?;
            let violations = scheduler.audit(run, &ws.snapshot);
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["worker_id", "shift_a", "shift_b", "kind"])?;
                    for v in &violations {
                        w.write_record([
                            v.worker.as_str(),
                            v.shift_a.as_str(),
                            v.shift_b.as_ref().map_or("", |s| s.as_str()),
                            v.kind.label(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Export {
            schedule,
            csv,
            json,
            ics,
            calendar_name,
        } => {
            let id = ScheduleId::new(schedule);
            let run = ws
                .schedules
                .find(&id)
                .with_context(|| format!("unknown schedule: {id}"))?;
            if let Some(path) = csv {
                io::export_schedule_csv(path, run, &ws.snapshot)?;
            }
            if let Some(path) = json {
                let warnings = ws.warnings.get(&id).map_or(&[][..], Vec::as_slice);
                io::export_schedule_json(path, run, warnings)?;
            }
            if let Some(path) = ics {
                calendar::export_schedule_ics(path, run, &ws.snapshot, &calendar_name)?;
            }
            0
        }
        Commands::SetShiftStatus {
            schedule,
            shift,
            status,
        } => {
            let status: ShiftStatus = status.parse().map_err(anyhow::Error::msg)?;
            let block = ws.schedules.set_shift_status(
                &ScheduleId::new(schedule),
                &ShiftId::new(shift),
                status,
            )?;
            println!("{} {}", block.id, block.status);
            storage.save(&ws)?;
            0
        }
        Commands::Notify { schedule, out_dir } => {
            let id = ScheduleId::new(schedule);
            let run = ws
                .schedules
                .find(&id)
                .with_context(|| format!("unknown schedule: {id}"))?;
            if run.status != ScheduleStatus::Published {
                bail!("schedule {id} is {}, publish it before notifying", run.status);
            }
            let out_dir = PathBuf::from(out_dir);
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;
            let digests = prepare_digests(run, &ws.snapshot, &TextDigest);
            for digest in &digests {
                let stem = match io::slug(digest.worker_id.as_str()) {
                    s if s.is_empty() => "worker".to_string(),
                    s => s,
                };
                let path = out_dir.join(format!("{stem}.txt"));
                fs::write(&path, &digest.content)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            println!("{} digest(s) written to {}", digests.len(), out_dir.display());
            0
        }
    };

    std::process::exit(code);
}
