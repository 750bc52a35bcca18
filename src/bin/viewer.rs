#![cfg(not(tarpaulin_include))]

use record_table::client::HttpClient;
use record_table::config::ClientConfig;
use record_table::dataset::{DatasetItem, TreeNode};
use record_table::filter::{AgeMode, FilterCriteria};
use record_table::optimistic::{CacheEntry, RecordTable};
use record_table::record::template_text;
use serde_json::json;
use std::env;

const USAGE: &str = "Usage: viewer <records|dataset|add NAME AGE ADDRESS> [options]

Options:
  --name TEXT        keep rows whose name contains TEXT
  --age TEXT         age filter (substring, or number with a mode)
  --less-than        toggle the 'age <= value' mode
  --greater-than     toggle the 'age >= value' mode
  --address TEXT     keep rows whose address contains TEXT
  --field TEXT       dataset only: app field filter
  --income TEXT      dataset only: app income filter
  --profit TEXT      dataset only: app profit filter
  --server URL       record server (default http://localhost:3001)
  --dataset URL      third-party dataset location";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };

    let mut positional = Vec::new();
    let mut criteria = FilterCriteria::default();
    let mut config = ClientConfig::default();

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--less-than" => criteria.select_age_mode(AgeMode::LessThan),
            "--greater-than" => criteria.select_age_mode(AgeMode::GreaterThan),
            flag if flag.starts_with("--") => {
                let Some(value) = rest.next().cloned() else {
                    eprintln!("missing value for {}", flag);
                    return Ok(());
                };
                match flag {
                    "--name" => criteria.name = value,
                    "--age" => criteria.age = value,
                    "--address" => criteria.address = value,
                    "--field" => criteria.field = value,
                    "--income" => criteria.income = value,
                    "--profit" => criteria.profit = value,
                    "--server" => config.base_url = value,
                    "--dataset" => config.dataset_url = value,
                    _ => {
                        eprintln!("unknown option {}\n\n{}", flag, USAGE);
                        return Ok(());
                    }
                }
            }
            _ => positional.push(arg.clone()),
        }
    }

    let client = HttpClient::new(config);

    match command.as_str() {
        "records" => {
            let mut table = RecordTable::new(client);
            if let Err(e) = table.refresh().await {
                eprintln!("Failed to load records: {}", e);
                return Ok(());
            }
            for row in table.filtered(&criteria) {
                print_cache_entry(row);
            }
        }
        "dataset" => {
            println!("Loading...");
            match client.fetch_dataset().await {
                Ok(dataset) => {
                    for item in dataset.filter(&criteria) {
                        print_dataset_item(item);
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        "add" => {
            if positional.len() != 3 {
                eprintln!("{}", USAGE);
                return Ok(());
            }
            let submission = json!({
                "name": positional[0],
                "age": positional[1],
                "address": positional[2],
            });

            let mut table = RecordTable::new(client);
            if let Err(e) = table.refresh().await {
                eprintln!("Failed to load records: {}", e);
                return Ok(());
            }
            match table.submit(submission).await {
                Ok(record) => println!("Added record {}: {}", record.key, record.description),
                Err(e) => eprintln!("Submission failed, nothing was added: {}", e),
            }
            for row in table.rows() {
                print_cache_entry(row);
            }
        }
        _ => eprintln!("{}", USAGE),
    }

    Ok(())
}

fn print_cache_entry(row: &CacheEntry) {
    let fields = row.fields();
    let cell = |name: &str| match fields.get(name) {
        Some(value) => template_text(Some(value)),
        None => String::new(),
    };

    let marker = if row.is_tentative() { " (pending)" } else { "" };
    println!(
        "{:<20} {:>4}  {}{}",
        cell("name"),
        cell("age"),
        cell("address"),
        marker
    );

    if let CacheEntry::Stored(record) = row {
        if record.is_expandable() {
            println!("    {}", record.description);
        }
    }
}

fn print_dataset_item(item: &DatasetItem) {
    println!(
        "{:<20} {:>4}  {}",
        item.graph.name, item.graph.age, item.graph.address
    );
    if !item.is_expandable() {
        return;
    }

    for app in item.app_rows() {
        println!("    {:<16} {:<12} {}", app.field, app.income, app.profit);
        if app.is_expandable() {
            for root in item.tree_roots() {
                print_tree(&root, 2);
            }
        }
    }
}

fn print_tree(node: &TreeNode, depth: usize) {
    println!("{}{}", "    ".repeat(depth), node.title);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}
