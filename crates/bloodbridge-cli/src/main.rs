// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use bloodbridge_api::Client;
use bloodbridge_app::{
    AppCommand, AppState, FormKind, FormPayload, ListRow, ListState, Role, ScreenKind,
};
use bloodbridge_tui::{ListRuntime, ViewData, page_controls_text, refresh_view_data};
use config::Config;
use runtime::{ApiRuntime, DemoRuntime, Submitter};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `bloodbridge --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_logging(&config)?;
    let page_size = options.page_size.unwrap_or_else(|| config.page_size());

    if options.demo {
        log::info!("starting with demo data");
        let mut runtime = DemoRuntime::new(bloodbridge_testkit::demo_data());
        if options.check_only {
            return Ok(());
        }
        return launch(&options, &config, Role::Admin, &mut runtime, page_size);
    }

    let timeout = config.api_timeout()?;
    let mut client = Client::new(config.api_base_url(), timeout).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        return Ok(());
    }

    let (email, password) = credentials_from_env()?;
    let session = client.login(&email, &password).context("log in")?;
    let mut runtime = ApiRuntime::new(client);
    launch(&options, &config, session.role, &mut runtime, page_size)
}

fn launch<R: ListRuntime + Submitter>(
    options: &CliOptions,
    config: &Config,
    role: Role,
    runtime: &mut R,
    page_size: i64,
) -> Result<()> {
    let mut state = AppState::for_role(role);
    let changed = apply_changes(options, runtime)?;
    for message in &changed {
        println!("{message}");
    }
    if !changed.is_empty() && options.list.is_none() {
        return Ok(());
    }

    if let Some(screen) = options.list {
        print!(
            "{}",
            render_list_page(&state, runtime, screen, options, page_size)?
        );
        return Ok(());
    }

    state.dispatch(AppCommand::OpenScreen(config.start_screen()));
    bloodbridge_tui::run_app(&mut state, runtime, page_size)
}

/// Runs `--submit` and `--delete`, returning one line per change.
fn apply_changes<R: Submitter>(options: &CliOptions, runtime: &mut R) -> Result<Vec<String>> {
    let mut messages = Vec::new();
    if let Some(kind) = options.submit {
        let mut payload = FormPayload::blank_for(kind);
        for (name, value) in &options.fields {
            payload.set_field(name, value)?;
        }
        payload
            .validate()
            .with_context(|| format!("{} form", kind.label()))?;
        let message = runtime
            .submit(&payload)
            .with_context(|| format!("submit {} form", kind.label()))?;
        log::info!("{message}");
        messages.push(message);
    }
    if let Some((screen, id)) = options.delete {
        runtime
            .remove(screen, id)
            .with_context(|| format!("delete {} {id}", screen.label()))?;
        log::info!("deleted {} {id}", screen.label());
        messages.push(format!("deleted {} {id}", screen.label()));
    }
    Ok(messages)
}

fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })?;
    simplelog::WriteLogger::init(config.log_level()?, simplelog::Config::default(), file)
        .map_err(|error| anyhow!("initialize logging: {error}"))
}

fn credentials_from_env() -> Result<(String, String)> {
    let email = env::var("BLOODBRIDGE_EMAIL").ok();
    let password = env::var("BLOODBRIDGE_PASSWORD").ok();
    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => bail!(
            "missing credentials -- set BLOODBRIDGE_EMAIL and BLOODBRIDGE_PASSWORD, or run with --demo"
        ),
    }
}

/// One page of `screen` as aligned text, followed by the summary and page
/// controls.
fn render_list_page<R: ListRuntime>(
    state: &AppState,
    runtime: &mut R,
    screen: ScreenKind,
    options: &CliOptions,
    page_size: i64,
) -> Result<String> {
    if !screen.is_list() {
        bail!(
            "{} is not a list; pass one of: donors, hospitals, requests, donations, inventory",
            screen.label()
        );
    }
    if !state.screens().contains(&screen) {
        bail!(
            "{} is not available for {}",
            screen.label(),
            state.role.as_str()
        );
    }

    let mut view_data = ViewData::new(page_size)?;
    refresh_view_data(state, runtime, &mut view_data)?;
    let query = options.query.as_str();
    let page = options.page;
    let text = match screen {
        ScreenKind::Dashboard => String::new(),
        ScreenKind::Donors => page_text(
            &bloodbridge_app::Donor::COLUMNS,
            &mut view_data.donors,
            query,
            page,
        ),
        ScreenKind::Hospitals => page_text(
            &bloodbridge_app::Hospital::COLUMNS,
            &mut view_data.hospitals,
            query,
            page,
        ),
        ScreenKind::Requests => page_text(
            &bloodbridge_app::BloodRequest::COLUMNS,
            &mut view_data.requests,
            query,
            page,
        ),
        ScreenKind::Donations => page_text(
            &bloodbridge_app::Donation::COLUMNS,
            &mut view_data.donations,
            query,
            page,
        ),
        ScreenKind::Inventory => page_text(
            &bloodbridge_app::InventoryEntry::COLUMNS,
            &mut view_data.inventory,
            query,
            page,
        ),
    };
    Ok(text)
}

fn page_text<R: ListRow>(
    columns: &[&str],
    list: &mut ListState<R>,
    query: &str,
    page: i64,
) -> String {
    list.set_query(query);
    list.set_page(page);
    let view = list.derive();

    let rows: Vec<Vec<String>> = view.visible_rows.iter().map(|row| row.cells()).collect();
    let mut widths: Vec<usize> = columns.iter().map(|column| column.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}", width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let header: Vec<String> = columns.iter().map(|column| (*column).to_owned()).collect();
    let mut out = String::new();
    out.push_str(&format_line(header.as_slice()));
    out.push('\n');
    for row in &rows {
        out.push_str(&format_line(row.as_slice()));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&view.summary());
    out.push('\n');
    out.push_str(&page_controls_text(&view.page_controls()));
    out.push('\n');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
    list: Option<ScreenKind>,
    query: String,
    page: i64,
    page_size: Option<i64>,
    submit: Option<FormKind>,
    fields: Vec<(String, String)>,
    delete: Option<(ScreenKind, i64)>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
        list: None,
        query: String::new(),
        page: 1,
        page_size: None,
        submit: None,
        fields: Vec::new(),
        delete: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--list requires a screen name"))?;
                let screen = ScreenKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown screen {:?}; use donors, hospitals, requests, donations, or inventory",
                        value.as_ref()
                    )
                })?;
                options.list = Some(screen);
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--query requires search text"))?;
                options.query = value.as_ref().to_owned();
            }
            "--page" => {
                options.page = parse_number("--page", iter.next())?;
            }
            "--page-size" => {
                options.page_size = Some(parse_number("--page-size", iter.next())?);
            }
            "--submit" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--submit requires a form name"))?;
                let kind = FormKind::parse(value.as_ref())
                    .filter(|kind| *kind != FormKind::Login)
                    .ok_or_else(|| {
                        anyhow!(
                            "unknown form {:?}; use donor, hospital, request, or donation",
                            value.as_ref()
                        )
                    })?;
                options.submit = Some(kind);
            }
            "--field" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--field requires name=value"))?;
                let (name, field_value) = value.as_ref().split_once('=').ok_or_else(|| {
                    anyhow!("--field expects name=value, got {:?}", value.as_ref())
                })?;
                options
                    .fields
                    .push((name.trim().to_owned(), field_value.to_owned()));
            }
            "--delete" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--delete requires <screen>/<id>"))?;
                options.delete = Some(parse_delete_target(value.as_ref())?);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if !options.fields.is_empty() && options.submit.is_none() {
        bail!("--field only applies to --submit; name the form with --submit <form>");
    }
    Ok(options)
}

fn parse_delete_target(value: &str) -> Result<(ScreenKind, i64)> {
    let (screen, id) = value
        .split_once('/')
        .ok_or_else(|| anyhow!("--delete expects <screen>/<id>, for example donors/4"))?;
    let screen = ScreenKind::parse(screen)
        .filter(|screen| screen.is_list())
        .ok_or_else(|| anyhow!("unknown screen {screen:?} in --delete {value:?}"))?;
    let id = parse_number("--delete", Some(id))?;
    Ok((screen, id))
}

fn parse_number<S: AsRef<str>>(flag: &str, value: Option<S>) -> Result<i64> {
    let value = value.ok_or_else(|| anyhow!("{flag} requires a number"))?;
    value
        .as_ref()
        .trim()
        .parse()
        .with_context(|| format!("{flag} expects a whole number, got {:?}", value.as_ref()))
}

fn print_help() {
    println!("bloodbridge");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with generated demo data (no server)");
    println!("  --check                  Validate config and API settings, then exit");
    println!("  --list <screen>          Print one page of a list instead of the TUI");
    println!("  --query <text>           Search text for --list");
    println!("  --page <n>               Page for --list (clamped to the last page)");
    println!("  --page-size <n>          Entries per page (default from [ui].page_size)");
    println!("  --submit <form>          Submit a donor, hospital, request, or donation form");
    println!("  --field <name=value>     Set a form field for --submit (repeatable)");
    println!("  --delete <screen>/<id>   Delete one entry, for example requests/12");
    println!("  --help                   Show this help");
    println!();
    println!("Credentials come from BLOODBRIDGE_EMAIL and BLOODBRIDGE_PASSWORD.");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, apply_changes, page_text, parse_cli_args, render_list_page};
    use crate::runtime::DemoRuntime;
    use anyhow::Result;
    use bloodbridge_app::{AppState, FormKind, ListState, Role, ScreenKind};
    use bloodbridge_testkit::{BloodFaker, demo_data};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/bloodbridge-config.toml")
    }

    fn rows(count: usize) -> Vec<Vec<String>> {
        (1..=count)
            .map(|index| vec![format!("donor {index}"), "O+".to_owned()])
            .collect()
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                demo: false,
                check_only: false,
                show_help: false,
                list: None,
                query: String::new(),
                page: 1,
                page_size: None,
                submit: None,
                fields: Vec::new(),
                delete: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for flag in [
            "--config",
            "--list",
            "--query",
            "--page",
            "--page-size",
            "--submit",
            "--field",
            "--delete",
        ] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains("requires"), "{flag}: {error}");
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_reads_list_options() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--demo",
                "--list",
                "Requests",
                "--query",
                "o+",
                "--page",
                "3",
                "--page-size",
                "10",
            ],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert_eq!(options.list, Some(ScreenKind::Requests));
        assert_eq!(options.query, "o+");
        assert_eq!(options.page, 3);
        assert_eq!(options.page_size, Some(10));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_bad_numbers_and_screens() {
        let error = parse_cli_args(vec!["--page", "two"], default_options_path())
            .expect_err("non-numeric page");
        assert!(error.to_string().contains("whole number"));

        let error = parse_cli_args(vec!["--list", "reports"], default_options_path())
            .expect_err("unknown screen");
        assert!(error.to_string().contains("unknown screen"));
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        assert!(parse_cli_args(vec!["--help"], default_options_path())?.show_help);
        assert!(parse_cli_args(vec!["-h"], default_options_path())?.show_help);
        Ok(())
    }

    #[test]
    fn page_text_prints_rows_summary_and_controls() -> Result<()> {
        let mut list = ListState::new(5)?.with_rows(rows(12));
        let text = page_text(&["Name", "Group"], &mut list, "", 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name      Group");
        assert_eq!(lines[1], "donor 6   O+");
        assert_eq!(lines[5], "donor 10  O+");
        assert!(text.contains("Showing 6 to 10 of 12 entries"));
        assert!(text.ends_with("‹ Previous  1 [2] 3  Next ›\n"));
        Ok(())
    }

    #[test]
    fn page_text_clamps_out_of_range_page() -> Result<()> {
        let mut list = ListState::new(5)?.with_rows(rows(12));
        let text = page_text(&["Name", "Group"], &mut list, "", 99);
        assert!(text.contains("Showing 11 to 12 of 12 entries"));

        let text = page_text(&["Name", "Group"], &mut list, "donor 1", -4);
        assert!(text.contains("Showing 1 to 4 of 4 entries"));
        Ok(())
    }

    #[test]
    fn list_mode_renders_demo_donors() -> Result<()> {
        let options = parse_cli_args(vec!["--list", "donors"], default_options_path())?;
        let mut runtime = DemoRuntime::new(demo_data());
        let state = AppState::for_role(Role::Admin);
        let text = render_list_page(&state, &mut runtime, ScreenKind::Donors, &options, 5)?;
        assert!(text.starts_with("Name"));
        assert!(text.contains("Showing 1 to 5 of 24 entries"));
        Ok(())
    }

    #[test]
    fn list_mode_respects_role_and_list_screens() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        let mut runtime = DemoRuntime::new(BloodFaker::new(2).dataset(3, 1));

        let state = AppState::for_role(Role::Donor);
        let error = render_list_page(&state, &mut runtime, ScreenKind::Donors, &options, 5)
            .expect_err("donors hidden from donor role");
        assert!(error.to_string().contains("not available for donor"));

        let error = render_list_page(&state, &mut runtime, ScreenKind::Dashboard, &options, 5)
            .expect_err("dashboard is not a list");
        assert!(error.to_string().contains("not a list"));
        Ok(())
    }

    #[test]
    fn list_mode_rejects_non_positive_page_size() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        let mut runtime = DemoRuntime::new(demo_data());
        let state = AppState::for_role(Role::Admin);
        let error = render_list_page(&state, &mut runtime, ScreenKind::Donors, &options, 0)
            .expect_err("zero page size");
        assert!(error.to_string().contains("page size must be positive"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_submission_options() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--submit",
                "Request",
                "--field",
                "patient_name=Drew Hill",
                "--field",
                "reason=needs = care",
                "--delete",
                "donations/12",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.submit, Some(FormKind::BloodRequest));
        assert_eq!(
            options.fields,
            vec![
                ("patient_name".to_owned(), "Drew Hill".to_owned()),
                ("reason".to_owned(), "needs = care".to_owned()),
            ]
        );
        assert_eq!(options.delete, Some((ScreenKind::Donations, 12)));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_bad_submission_options() {
        for (args, expected) in [
            (vec!["--submit", "login"], "unknown form"),
            (vec!["--submit", "invoice"], "unknown form"),
            (vec!["--submit", "request", "--field", "units"], "name=value"),
            (vec!["--field", "units=2"], "only applies to --submit"),
            (vec!["--delete", "donors"], "<screen>/<id>"),
            (vec!["--delete", "dashboard/1"], "unknown screen"),
            (vec!["--delete", "donors/four"], "whole number"),
        ] {
            let error = parse_cli_args(args.clone(), default_options_path())
                .expect_err("invalid submission options");
            assert!(
                format!("{error:#}").contains(expected),
                "{args:?}: {error:#}"
            );
        }
    }

    #[test]
    fn submitted_request_shows_up_in_list_mode() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--submit",
                "request",
                "--field",
                "patient_name=Zora Quill",
                "--field",
                "blood_group=O+",
                "--field",
                "units=1",
                "--field",
                "reason=surgery",
                "--list",
                "requests",
                "--query",
                "zora",
            ],
            default_options_path(),
        )?;
        let mut runtime = DemoRuntime::new(demo_data());
        let messages = apply_changes(&options, &mut runtime)?;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("created request"));

        let state = AppState::for_role(Role::Admin);
        let text = render_list_page(&state, &mut runtime, ScreenKind::Requests, &options, 5)?;
        assert!(text.contains("Zora Quill"));
        assert!(text.contains("Showing 1 to 1 of 1 entries"));
        Ok(())
    }

    #[test]
    fn invalid_submission_names_the_form_and_changes_nothing() -> Result<()> {
        let options = parse_cli_args(
            vec!["--submit", "donation", "--field", "units=2"],
            default_options_path(),
        )?;
        let data = demo_data();
        let donations = data.donations.len();
        let mut runtime = DemoRuntime::new(data);
        let error = apply_changes(&options, &mut runtime).expect_err("missing fields");
        let chain = format!("{error:#}");
        assert!(chain.contains("donation form"));
        assert!(chain.contains("blood group is required"));

        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert!(apply_changes(&options, &mut runtime)?.is_empty());
        let state = AppState::for_role(Role::Admin);
        let text = render_list_page(&state, &mut runtime, ScreenKind::Donations, &options, 5)?;
        assert!(text.contains(&format!("of {donations} entries")));
        Ok(())
    }

    #[test]
    fn delete_removes_entry_before_listing() -> Result<()> {
        let options = parse_cli_args(
            vec!["--delete", "donors/1", "--list", "donors"],
            default_options_path(),
        )?;
        let mut runtime = DemoRuntime::new(demo_data());
        assert_eq!(apply_changes(&options, &mut runtime)?, vec!["deleted donors 1"]);

        let state = AppState::for_role(Role::Admin);
        let text = render_list_page(&state, &mut runtime, ScreenKind::Donors, &options, 5)?;
        assert!(text.contains("Showing 1 to 5 of 23 entries"));
        Ok(())
    }
}
