use std::io::{self, Write};
use std::str::FromStr;

use timetable_core::{
    AlwaysAck, CourseAssignment, MoveRequest, SlotIndex, SlotKey, SubstituteLog, SubstituteRecord,
    TimetableSnapshot, conflict, engine, load_assignments_from_csv, load_snapshot_from_json,
    logging, save_assignments_to_csv, save_snapshot_to_json,
    slot::{Day, Period},
};

fn print_help() {
    println!(
        "Commands:\n  help                                Show this help\n  show                                Render the weekly grid\n  slot <Day-Period>                   List occupants of one slot\n  load <json|csv> <path>              Load a timetable from disk\n  save <json|csv> <path>              Save the timetable to disk\n  move <id> <from> <to>               Relocate an assignment (e.g. move c7 Tue-10:00 Wed-11:00)\n  check <id> <from> <to>              Screen a move for conflicts without applying it\n  subs                                List substitute bookings\n  subs add <date> <orig> <sub> <course> <slot>\n                                      Record a substitute booking (date YYYY-MM-DD)\n  subs del <id>                       Delete a substitute booking\n  quit|exit                           Exit"
    );
}

fn cell_text(assignment: &CourseAssignment) -> String {
    format!(
        "{} {} ({}, {})",
        assignment.id, assignment.name, assignment.professor, assignment.room
    )
}

fn render_grid(index: &SlotIndex) -> String {
    let header: Vec<String> = std::iter::once("Time / Day".to_string())
        .chain(Day::ALL.iter().map(|d| d.to_string()))
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for period in Period::ALL {
        let mut row = vec![period.to_string()];
        for day in Day::ALL {
            let occupants = index.get(SlotKey::new(day, period));
            row.push(
                occupants
                    .iter()
                    .map(cell_text)
                    .collect::<Vec<_>>()
                    .join("; "),
            );
        }
        rows.push(row);
    }

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in &rows {
        for (column, value) in row.iter().enumerate() {
            if value.len() > widths[column] {
                widths[column] = value.len();
            }
        }
    }

    let mut sep = String::from("+");
    for width in &widths {
        sep.push_str(&"-".repeat(width + 2));
        sep.push('+');
    }

    let render_row = |row: &[String]| {
        let mut line = String::from("|");
        for (column, value) in row.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[column] - value.len()));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&header));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn parse_slot(input: &str) -> Option<SlotKey> {
    match SlotKey::from_str(input) {
        Ok(key) => Some(key),
        Err(err) => {
            println!("{err}");
            None
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = std::env::var("TIMETABLE_LOG_LEVEL")
        .unwrap_or_else(|_| logging::default_spec().to_string());
    logging::init(&spec)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut index = SlotIndex::default();
    let mut substitutes = SubstituteLog::new();
    let sync = AlwaysAck;

    println!("timetable-core CLI. Type 'help' for commands.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["help"] => print_help(),
            ["quit"] | ["exit"] => break,
            ["show"] => print!("{}", render_grid(&index)),
            ["slot", key] => {
                if let Some(slot) = parse_slot(key) {
                    let occupants = index.get(slot);
                    if occupants.is_empty() {
                        println!("{slot}: (empty)");
                    } else {
                        for assignment in occupants {
                            println!("{slot}: {}", cell_text(assignment));
                        }
                    }
                }
            }
            ["load", "json", path] => match load_snapshot_from_json(path) {
                Ok(snapshot) => {
                    let (loaded_index, loaded_subs) = snapshot.restore();
                    index = loaded_index;
                    substitutes = loaded_subs;
                    println!("Timetable loaded from {path} ({} assignments).", index.len());
                }
                Err(err) => println!("Load failed: {err}"),
            },
            ["load", "csv", path] => match load_assignments_from_csv(path) {
                Ok(assignments) => {
                    index = SlotIndex::build(assignments);
                    println!("Timetable loaded from {path} ({} assignments).", index.len());
                }
                Err(err) => println!("Load failed: {err}"),
            },
            ["save", "json", path] => {
                let snapshot = TimetableSnapshot::capture(&index, &substitutes);
                match save_snapshot_to_json(&snapshot, path) {
                    Ok(()) => println!("Timetable saved to {path}."),
                    Err(err) => println!("Save failed: {err}"),
                }
            }
            ["save", "csv", path] => {
                match save_assignments_to_csv(&index.to_records(), path) {
                    Ok(()) => println!("Timetable saved to {path}."),
                    Err(err) => println!("Save failed: {err}"),
                }
            }
            ["move", id, from, to] => {
                let (Some(source), Some(target)) = (parse_slot(from), parse_slot(to)) else {
                    continue;
                };
                let request = MoveRequest {
                    source,
                    assignment_id: id.to_string(),
                    target,
                };
                match runtime.block_on(engine::relocate(&index, &request, &sync)) {
                    Ok(committed) => {
                        index = committed;
                        println!("Moved '{id}' to {target}.");
                    }
                    Err(err) => println!("{err}"),
                }
            }
            ["check", id, from, to] => {
                let (Some(source), Some(target)) = (parse_slot(from), parse_slot(to)) else {
                    continue;
                };
                match index.get(source).iter().find(|a| a.id == *id) {
                    None => println!("assignment '{id}' not found in slot {source}"),
                    Some(moved) => {
                        let result = conflict::check(index.get(target), moved);
                        println!("{result}");
                    }
                }
            }
            ["subs"] => {
                if substitutes.is_empty() {
                    println!("No substitute bookings.");
                }
                for record in substitutes.records() {
                    println!(
                        "{} {} {}: {} covers {} for {}",
                        record.id,
                        record.date,
                        record.slot,
                        record.substitute_teacher,
                        record.course_id,
                        record.original_teacher
                    );
                }
            }
            ["subs", "add", date, original, substitute, course, slot] => {
                let Some(slot) = parse_slot(slot) else {
                    continue;
                };
                match date.parse() {
                    Ok(date) => {
                        let added = substitutes.add(SubstituteRecord {
                            id: String::new(),
                            date,
                            original_teacher: original.to_string(),
                            substitute_teacher: substitute.to_string(),
                            course_id: course.to_string(),
                            slot,
                        });
                        println!("Recorded substitution {}.", added.id);
                    }
                    Err(err) => println!("invalid date '{date}': {err}"),
                }
            }
            ["subs", "del", id] => match substitutes.remove(id) {
                Ok(_) => println!("Deleted substitution {id}."),
                Err(err) => println!("{err}"),
            },
            _ => println!("Unrecognized command. Type 'help' for usage."),
        }
    }
    Ok(())
}
