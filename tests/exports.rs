#![forbid(unsafe_code)]
use chrono::NaiveDate;
use deskrota::io::{export_warnings_csv, import_availability_csv, import_locations_csv, write_schedule_csv};
use deskrota::{
    prepare_digests, schedule_to_ics, HourRange, Location, LocationId, ScheduleId, ScheduleRun,
    ShiftBlock, ShiftId, ShiftStatus, Snapshot, TextDigest, WorkDay, Worker, WorkerId,
};
use std::fs;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot() -> Snapshot {
    Snapshot {
        locations: vec![
            Location::new("Bristlecone", 1, 1, 3).with_id(LocationId::new("bristlecone")),
            Location::new("Library", 1, 2, 1).with_id(LocationId::new("library")),
        ],
        workers: vec![
            Worker::new("Sam", 12.0).with_id(WorkerId::new("sam")),
            Worker::new("Alex", 20.0).with_id(WorkerId::new("alex")),
            Worker::new("Jordan", 8.0).with_id(WorkerId::new("jordan")),
        ],
        ..Snapshot::default()
    }
}

fn shift(seq: u32, worker: &str, location: &str, day: WorkDay, start: u8, end: u8) -> ShiftBlock {
    ShiftBlock {
        id: ShiftId::new(format!("week-23-{seq:03}")),
        schedule: ScheduleId::new("week-23"),
        worker: WorkerId::new(worker),
        location: LocationId::new(location),
        day,
        hours: HourRange::new(start, end).unwrap(),
        actual_date: date(2024, 6, 3) + chrono::Days::new(u64::from(day.offset())),
        status: ShiftStatus::Scheduled,
    }
}

fn schedule() -> ScheduleRun {
    let mut run = ScheduleRun::draft(ScheduleId::new("week-23"), date(2024, 6, 3), "supervisor", None);
    run.shifts = vec![
        shift(1, "sam", "library", WorkDay::Tuesday, 13, 16),
        shift(2, "alex", "bristlecone", WorkDay::Monday, 8, 12),
        shift(3, "sam", "library", WorkDay::Monday, 9, 11),
    ];
    run
}

#[test]
fn availability_matrix_is_merged_into_windows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("availability.csv");
    fs::write(
        &path,
        "Name,Max_Hours,Monday_8:00,Monday_9:00,Monday_10:00,Monday_11:00,Tuesday_8:00,Tuesday_9:00\n\
         Alex,20,1,1,0,1,0,1\n\
         Sam Lee,12.5,0,0,0,0,1,1\n",
    )
    .unwrap();

    let (workers, windows) = import_availability_csv(&path).unwrap();
    assert_eq!(workers.len(), 2);
    assert_eq!(workers[1].id, WorkerId::new("sam-lee"));
    assert_eq!(workers[1].name, "Sam Lee");
    assert_eq!(workers[1].max_hours, 12.5);

    let spans: Vec<(&str, WorkDay, u8, u8)> = windows
        .iter()
        .map(|w| (w.worker.as_str(), w.day, w.start_hour, w.end_hour))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("alex", WorkDay::Monday, 8, 10),
            ("alex", WorkDay::Monday, 11, 12),
            ("alex", WorkDay::Tuesday, 9, 10),
            ("sam-lee", WorkDay::Tuesday, 8, 10),
        ]
    );
}

#[test]
fn availability_matrix_rejects_bad_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("availability.csv");
    fs::write(&path, "Name,Max_Hours,Monday_8:00\nAlex,lots,1\n").unwrap();
    assert!(import_availability_csv(&path).is_err());

    fs::write(&path, "Name,Max_Hours,Saturday_8:00\nAlex,10,1\n").unwrap();
    assert!(import_availability_csv(&path).is_err());
}

#[test]
fn locations_import_derives_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("locations.csv");
    fs::write(&path, "name,min_staff,max_staff,priority\nMain Desk,2,4,1\nLibrary,1,2,\n").unwrap();

    let locations = import_locations_csv(&path).unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].id, LocationId::new("main-desk"));
    assert_eq!(locations[0].priority, 1);
    assert_eq!(locations[1].priority, 0);

    fs::write(&path, "name,min_staff,max_staff\nLibrary,3,2\n").unwrap();
    assert!(import_locations_csv(&path).is_err());
}

#[test]
fn schedule_csv_is_sorted_by_date_and_start() {
    let mut out = Vec::new();
    write_schedule_csv(&mut out, &schedule(), &snapshot()).unwrap();
    let csv = String::from_utf8(out).unwrap();

    insta::assert_snapshot!(csv.trim_end(), @r###"
    Day,Date,Start,End,Location,Worker
    Monday,2024-06-03,08:00,12:00,Bristlecone,Alex
    Monday,2024-06-03,09:00,11:00,Library,Sam
    Tuesday,2024-06-04,13:00,16:00,Library,Sam
    "###);
}

#[test]
fn warnings_csv_has_one_row_per_warning() {
    let snapshot = Snapshot {
        locations: vec![Location::new("Library", 1, 1, 0).with_id(LocationId::new("library"))],
        ..Snapshot::default()
    };
    let request = deskrota::GenerateRequest::new(date(2024, 6, 3), "t");
    let generated = deskrota::generate_week(&snapshot, request).unwrap();
    assert_eq!(generated.warnings.len(), 5);

    let dir = tempdir().unwrap();
    let path = dir.path().join("warnings.csv");
    export_warnings_csv(&path, &generated.warnings).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Day,Date,Time Slot,Location,Message"));
    assert_eq!(
        lines.next(),
        Some("Monday,2024-06-03,8:00-18:00,Library,\"Could not fill minimum staffing (need 1, filled 0)\"")
    );
    assert_eq!(lines.count(), 4);
}

#[test]
fn ics_has_one_event_per_shift() {
    let ics = schedule_to_ics(&schedule(), &snapshot(), "Help Desk");
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
    assert!(ics.contains("X-WR-CALNAME:Help Desk\r\n"));
    assert!(ics.contains("UID:week-23-002@deskrota\r\n"));
    assert!(ics.contains("SUMMARY:Help Desk: Bristlecone\r\n"));
    assert!(ics.contains("DTSTART:20240603T080000\r\n"));
    assert!(ics.contains("DTEND:20240603T120000\r\n"));
    assert!(ics.contains("DESCRIPTION:Worker: Sam\\nLocation: Library\r\n"));
}

#[test]
fn digests_only_for_workers_with_shifts() {
    let digests = prepare_digests(&schedule(), &snapshot(), &TextDigest);
    let ids: Vec<&str> = digests.iter().map(|d| d.worker_id.as_str()).collect();
    assert_eq!(ids, vec!["alex", "sam"]);

    let sam = &digests[1];
    assert_eq!(sam.shift_count, 2);
    assert_eq!(sam.hours, 5);
    assert!(sam.content.starts_with("Hi Sam,"));
    assert!(sam.content.contains("week of 2024-06-03 (5h)"));
    assert!(sam.content.contains("- Monday 2024-06-03  09:00-11:00  @ Library\n"));
    assert!(sam.content.contains("- Tuesday 2024-06-04  13:00-16:00  @ Library\n"));
}

#[test]
fn ics_folds_long_lines_and_stamps_in_utc() {
    let mut snapshot = snapshot();
    snapshot.locations[0].name = format!("Bristlecone {}", "Annex ".repeat(12));
    let ics = schedule_to_ics(&schedule(), &snapshot, "Help Desk");

    for line in ics.split("\r\n") {
        assert!(line.len() <= 75, "{line:?} is {} octets", line.len());
    }
    assert!(ics.contains("DTSTAMP:20240603T000000Z\r\n"));

    let unfolded = ics.replace("\r\n ", "");
    assert!(unfolded.contains(&format!("LOCATION:{}\r\n", snapshot.locations[0].name)));
}

#[test]
fn locations_without_usable_name_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("locations.csv");
    fs::write(&path, "name,min_staff,max_staff\n!!!,1,2\n").unwrap();
    assert!(import_locations_csv(&path).is_err());
}
