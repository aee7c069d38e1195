use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use transport_catalogue::{snapshot, RoutingEngine};

mod handler;
mod requests;

use handler::{RequestHandler, Response};
use requests::{load_catalogue, BaseDocument, StatDocument};

#[derive(Parser, Debug)]
#[command(
    name = "transport-catalogue",
    author,
    version,
    about = "Bus network catalogue with fastest-route queries",
    long_about = "Builds a bus network from JSON base requests and stores it, together with \
                  its routing graph, as a binary snapshot (make-base).\n\n\
                  The snapshot is then restored without rebuilding the graph to answer stop, \
                  bus and route stat requests (process-requests)."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the catalogue and routing graph, then write the snapshot
    MakeBase {
        /// Input JSON document (read from stdin when omitted)
        input: Option<PathBuf>,
    },
    /// Restore the snapshot and answer stat requests
    ProcessRequests {
        /// Input JSON document (read from stdin when omitted)
        input: Option<PathBuf>,

        /// Write the JSON answers to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the JSON answers
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match args.command {
        Command::MakeBase { input } => {
            let document: BaseDocument = read_document(input.as_deref())?;
            make_base(&document)
        }
        Command::ProcessRequests { input, output } => {
            let document: StatDocument = read_document(input.as_deref())?;
            let responses = process_requests(&document)?;
            write_responses(&responses, output.as_deref())
        }
    }
}

fn read_document<T: DeserializeOwned>(input: Option<&Path>) -> Result<T> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Failed to parse input document")
}

fn make_base(document: &BaseDocument) -> Result<()> {
    let catalogue =
        load_catalogue(&document.base_requests).context("Failed to load base requests")?;
    let engine = RoutingEngine::build(&catalogue, document.routing_settings)
        .context("Failed to build routing graph")?;
    tracing::info!(
        stops = catalogue.stop_count(),
        routes = catalogue.route_count(),
        edges = engine.graph().edge_count(),
        "built catalogue"
    );

    let path = &document.serialization_settings.file;
    let bytes = snapshot::serialize(&catalogue, document.render_settings.as_ref(), &engine);
    snapshot::write_snapshot(path, &bytes)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    Ok(())
}

fn process_requests(document: &StatDocument) -> Result<Vec<Response>> {
    let path = &document.serialization_settings.file;
    let snapshot = snapshot::read_snapshot(path)
        .with_context(|| format!("Failed to restore snapshot from {}", path.display()))?;

    let handler = RequestHandler::new(&snapshot.catalogue, &snapshot.engine);
    let responses = handler.handle_all(&document.stat_requests);
    tracing::info!(requests = responses.len(), "answered stat requests");
    Ok(responses)
}

fn write_responses(responses: &[Response], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(responses).context("Failed to serialize answers")?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write answers to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write answers")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use handler::RouteItem;
    use serde_json::json;

    fn base_document(file: &Path) -> BaseDocument {
        serde_json::from_value(json!({
            "serialization_settings": { "file": file },
            "routing_settings": { "bus_wait_time": 6, "bus_velocity": 40 },
            "base_requests": [
                { "type": "Bus", "name": "14", "stops": ["Lipetskaya ulitsa 46", "Elektroseti", "Ulitsa Dokuchaeva", "Lipetskaya ulitsa 46"], "is_roundtrip": true },
                { "type": "Bus", "name": "114", "stops": ["Morskoy vokzal", "Rivyerskiy most"], "is_roundtrip": false },
                { "type": "Stop", "name": "Rivyerskiy most", "latitude": 43.587795, "longitude": 39.716901,
                  "road_distances": { "Morskoy vokzal": 850 } },
                { "type": "Stop", "name": "Morskoy vokzal", "latitude": 43.581969, "longitude": 39.719848,
                  "road_distances": { "Rivyerskiy most": 850 } },
                { "type": "Stop", "name": "Elektroseti", "latitude": 43.598701, "longitude": 39.730623,
                  "road_distances": { "Ulitsa Dokuchaeva": 3000, "Lipetskaya ulitsa 46": 4300 } },
                { "type": "Stop", "name": "Ulitsa Dokuchaeva", "latitude": 43.585586, "longitude": 39.733879,
                  "road_distances": { "Lipetskaya ulitsa 46": 2000, "Elektroseti": 3000 } },
                { "type": "Stop", "name": "Lipetskaya ulitsa 46", "latitude": 43.581969, "longitude": 39.719848,
                  "road_distances": { "Elektroseti": 4300, "Ulitsa Dokuchaeva": 2000 } }
            ]
        }))
        .unwrap()
    }

    fn stat_document(file: &Path) -> StatDocument {
        serde_json::from_value(json!({
            "serialization_settings": { "file": file },
            "stat_requests": [
                { "id": 1, "type": "Stop", "name": "Elektroseti" },
                { "id": 2, "type": "Bus", "name": "114" },
                { "id": 3, "type": "Route", "from": "Morskoy vokzal", "to": "Rivyerskiy most" },
                { "id": 4, "type": "Route", "from": "Morskoy vokzal", "to": "Elektroseti" },
                { "id": 5, "type": "Map" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_make_base_then_process_requests() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transport_catalogue.db");

        make_base(&base_document(&file)).unwrap();
        assert!(file.exists());

        let responses = process_requests(&stat_document(&file)).unwrap();
        assert_eq!(responses.len(), 5);

        assert_eq!(
            responses[0],
            Response::Stop {
                request_id: 1,
                buses: vec!["14".to_owned()],
            }
        );

        let Response::Bus {
            route_length,
            stop_count,
            unique_stop_count,
            ..
        } = &responses[1]
        else {
            panic!("expected bus stat, got {:?}", responses[1]);
        };
        assert_eq!(*route_length, 1700);
        assert_eq!(*stop_count, 3);
        assert_eq!(*unique_stop_count, 2);

        // wait 6 + 850 m at 40 km/h
        let Response::Route {
            total_time, items, ..
        } = &responses[2]
        else {
            panic!("expected route, got {:?}", responses[2]);
        };
        assert!((total_time - 7.275).abs() < 1e-9);
        assert_eq!(
            items[0],
            RouteItem::Wait {
                stop_name: "Morskoy vokzal".to_owned(),
                time: 6.0,
            }
        );

        let not_found = Response::Error {
            request_id: 4,
            error_message: "not found".to_owned(),
        };
        assert_eq!(responses[3], not_found);
        assert!(matches!(
            &responses[4],
            Response::Error { request_id: 5, error_message } if error_message == "map rendering is not supported"
        ));
    }

    #[test]
    fn test_process_requests_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.db");
        let error = process_requests(&stat_document(&file)).unwrap_err();
        assert!(error.to_string().contains("Failed to restore snapshot"));
    }

    #[test]
    fn test_make_base_rejects_missing_distance() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transport_catalogue.db");
        let document: BaseDocument = serde_json::from_value(json!({
            "serialization_settings": { "file": &file },
            "routing_settings": { "bus_wait_time": 6, "bus_velocity": 40 },
            "base_requests": [
                { "type": "Stop", "name": "A", "latitude": 43.58, "longitude": 39.71 },
                { "type": "Stop", "name": "B", "latitude": 43.59, "longitude": 39.72 },
                { "type": "Bus", "name": "1", "stops": ["A", "B"], "is_roundtrip": false }
            ]
        }))
        .unwrap();

        let error = make_base(&document).unwrap_err();
        assert!(error.to_string().contains("Failed to build routing graph"));
        assert!(!file.exists());
    }

    #[test]
    fn test_write_responses_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("answers.json");
        let responses = vec![Response::Stop {
            request_id: 1,
            buses: vec![],
        }];

        write_responses(&responses, Some(&output)).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, json!([{ "request_id": 1, "buses": [] }]));
    }

    #[test]
    fn test_cli_arguments() {
        let args = Args::try_parse_from([
            "transport-catalogue",
            "process-requests",
            "requests.json",
            "--output",
            "answers.json",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        assert!(matches!(
            args.command,
            Command::ProcessRequests { input: Some(_), output: Some(_) }
        ));
    }
}
