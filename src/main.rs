/*
 * WHOIS Record Resolver
 * Copyright (C) 2024 Akaere Networks
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{ Context, Result };
use clap::Parser;
use serde_json::{ Map, Value as Json, json };
use tracing::{ Level, debug, info };
use tracing_subscriber::fmt::format::FmtSpan;

use whois_record::config::Cli;
use whois_record::{ Record, Resolver, ServerId, Value };

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let config = args.resolver_config();
    let resolver = Resolver::new(config.clone());

    let record = match &args.host {
        Some(host) => {
            let server = ServerId::parse_referral(host, config.port).with_context(|| format!("Invalid server: {}", host))?;
            info!("Querying {} directly", server);
            resolver.resolve_from(&args.identifier, server).await
        }
        None => resolver.resolve(&args.identifier).await,
    };

    let record = match record {
        Ok(record) => record,
        Err(e) => {
            if let Some(partial) = e.partial_record() {
                debug!("Partial record before failure:\n{}", partial);
            }
            return Err(e).with_context(|| format!("Failed to resolve {}", args.identifier));
        }
    };

    if args.raw {
        print_raw(&record);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&record))?);
    } else {
        print_summary(&record);
    }

    Ok(())
}

fn print_raw(record: &Record) {
    for part in record.parts() {
        println!("% {}", part.server());
        println!("{}", part.body().trim_end());
        println!();
    }
}

fn summary_json(record: &Record) -> Json {
    let properties: Map<String, Json> = record
        .properties()
        .into_iter()
        .map(|(property, value)| (property.name().trim_end_matches('?').to_string(), json!(value)))
        .collect();

    json!({
        "query": record.query(),
        "servers": record.parts().iter().map(|part| part.server().to_string()).collect::<Vec<_>>(),
        "invalid": record.invalid(),
        "throttled": record.response_throttled(),
        "properties": properties,
    })
}

fn print_summary(record: &Record) {
    let servers: Vec<String> = record.parts().iter().map(|part| part.server().to_string()).collect();
    println!("query: {}", record.query());
    println!("servers: {}", servers.join(" -> "));
    if record.response_throttled() {
        println!("note: response was throttled");
    }

    for (property, value) in record.properties() {
        match value {
            Some(value) => println!("{}: {}", property, render(&value)),
            None => println!("{}: -", property),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::TextList(list) => list.join(", "),
        Value::Flag(flag) => flag.to_string(),
        Value::Time(time) => time.to_rfc3339(),
        Value::Registrar(registrar) => [&registrar.name, &registrar.id, &registrar.url]
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(" / "),
        Value::Contacts(contacts) => contacts
            .iter()
            .map(|contact| {
                contact.name
                    .as_deref()
                    .or(contact.organization.as_deref())
                    .or(contact.id.as_deref())
                    .unwrap_or("?")
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Nameservers(nameservers) => nameservers
            .iter()
            .map(|ns| match &ns.ipv4 {
                Some(ip) => format!("{} ({})", ns.name, ip),
                None => ns.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}
