//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `backlog_core` linkage.
//! - `demo` walks the reference ordering scenarios and prints each result.
//!
//! Configuration comes from `BACKLOG_*` environment variables; without
//! `BACKLOG_DB_PATH` the demo runs against an in-memory database.

use backlog_core::db::open_db_with_config;
use backlog_core::{
    init_logging_with_config, CoreConfig, ItemId, NewOrderedItem, OrderedKind, OrderingService,
    ScopeId, ScopeRepository, SqliteScopeRepository,
};
use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    println!("backlog_core ping={}", backlog_core::ping());
    println!("backlog_core version={}", backlog_core::core_version());

    let command = std::env::args().nth(1);
    let result = match command.as_deref() {
        None => Ok(()),
        Some("demo") => run_demo(),
        Some(other) => Err(format!("unknown command `{other}`; expected `demo`").into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo() -> CliResult<()> {
    let config = CoreConfig::from_env()?;
    init_logging_with_config(&config)?;
    let conn = open_db_with_config(&config)?;
    info!("event=cli_demo module=cli status=start");

    let project = SqliteScopeRepository::new(&conn).create_project("Demo")?;
    let service = OrderingService::new(&conn);
    let mut names = HashMap::new();

    let backlog = project.backlog_id;
    let epics = append_named(
        &service,
        &mut names,
        OrderedKind::Epic,
        backlog,
        &["A", "B", "C", "D"],
    )?;
    let (a, c, d) = (epics[0], epics[2], epics[3]);
    print_scope(&service, &names, "start", OrderedKind::Epic, backlog)?;

    service.reorder(OrderedKind::Epic, d, backlog, 1)?;
    print_scope(&service, &names, "reorder D to 1", OrderedKind::Epic, backlog)?;

    service.reorder(OrderedKind::Epic, d, backlog, 3)?;
    service.reorder(OrderedKind::Epic, a, backlog, 3)?;
    print_scope(&service, &names, "reorder A to 3", OrderedKind::Epic, backlog)?;

    service.reorder(OrderedKind::Epic, a, backlog, 0)?;
    service.archive(OrderedKind::Epic, c, backlog)?;
    print_scope(&service, &names, "archive C", OrderedKind::Epic, backlog)?;

    let source = epics[0];
    let target = epics[1];
    let stories = append_named(
        &service,
        &mut names,
        OrderedKind::UserStory,
        source,
        &["s-A", "s-B", "s-C", "s-D"],
    )?;
    service.transfer(OrderedKind::UserStory, stories[1], source, target, 0)?;
    print_scope(&service, &names, "move s-B source", OrderedKind::UserStory, source)?;
    print_scope(&service, &names, "move s-B target", OrderedKind::UserStory, target)?;

    info!("event=cli_demo module=cli status=ok");
    Ok(())
}

fn append_named(
    service: &OrderingService<'_>,
    names: &mut HashMap<ItemId, String>,
    kind: OrderedKind,
    scope_id: ScopeId,
    titles: &[&str],
) -> CliResult<Vec<ItemId>> {
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        let item = service.append(kind, scope_id, &NewOrderedItem::titled(*title))?;
        names.insert(item.id, (*title).to_string());
        ids.push(item.id);
    }
    Ok(ids)
}

fn print_scope(
    service: &OrderingService<'_>,
    names: &HashMap<ItemId, String>,
    label: &str,
    kind: OrderedKind,
    scope_id: ScopeId,
) -> CliResult<()> {
    let titles: Vec<&str> = service
        .list(kind, scope_id, false)?
        .iter()
        .map(|item| names.get(&item.id).map(String::as_str).unwrap_or("?"))
        .collect();
    println!("{label}: [{}]", titles.join(", "));
    Ok(())
}
