//! Client commands: `zone`, `record` and `probe`

use dnsm_core::{Error, Record, Zone};
use reqwest::Method;
use std::fmt::Write as _;
use std::time::Instant;

use crate::client::ManagerClient;

/// Zone to use for `domain`: the explicit one, or everything after the
/// first dot
pub fn resolve_zone(domain: &str, zone: Option<String>) -> Result<String, Error> {
    if let Some(zone) = zone.filter(|z| !z.is_empty()) {
        return Ok(zone);
    }

    match domain.split_once('.') {
        Some((_, zone)) if !zone.is_empty() => {
            println!("Using {:?} as zone", zone);
            Ok(zone.to_string())
        }
        _ => Err(Error::invalid_input(format!("no dots in name {:?}", domain))),
    }
}

/// What `zone add` prints once the zone exists
pub fn render_zone_created(zone: &Zone) -> String {
    let mut out = format!(
        "Zone {} created!\n\nTo publish your zone, you need to configure your registrar to use the following nameservers:\n",
        zone.name()
    );
    for server in &zone.dns_servers {
        let _ = writeln!(out, "- {}", server);
    }
    out
}

pub async fn zone_add(client: &ManagerClient, name: &str) -> anyhow::Result<()> {
    let zone: Option<Zone> = client
        .send::<(), _>(Method::PUT, "/zone", &[("name", name)], None)
        .await?;

    // A reply without a body still means the zone exists
    let zone = zone.unwrap_or_else(|| Zone::new(name));
    print!("{}", render_zone_created(&zone));
    Ok(())
}

pub async fn zone_delete(client: &ManagerClient, name: &str) -> anyhow::Result<()> {
    client
        .send::<(), serde_json::Value>(Method::DELETE, "/zone", &[("name", name)], None)
        .await?;
    println!("Deleted.");
    Ok(())
}

pub async fn record_add(
    client: &ManagerClient,
    zone: &str,
    domain: &str,
    record_type: &str,
    answer: Vec<String>,
) -> anyhow::Result<()> {
    let answers = vec![answer];
    client
        .send::<_, Record>(
            Method::PUT,
            "/record",
            &[("zone", zone), ("domain", domain), ("type", record_type)],
            Some(&answers),
        )
        .await?;
    println!("Added");
    Ok(())
}

pub async fn record_delete(
    client: &ManagerClient,
    zone: &str,
    domain: &str,
    record_type: &str,
) -> anyhow::Result<()> {
    client
        .send::<(), serde_json::Value>(
            Method::DELETE,
            "/record",
            &[("zone", zone), ("domain", domain), ("type", record_type)],
            None,
        )
        .await?;
    println!("Deleted");
    Ok(())
}

/// List zones straight from NS1, then time `rounds` more list calls
#[cfg(feature = "ns1")]
pub async fn probe(rounds: u32) -> anyhow::Result<()> {
    use dnsm_provider_ns1::Ns1Gateway;

    let api_key = std::env::var("NS1_APIKEY").unwrap_or_default();
    if api_key.is_empty() {
        return Err(Error::config("NS1_APIKEY environment variable is not set, giving up").into());
    }
    let endpoint = std::env::var("NS1_ENDPOINT").ok().filter(|e| !e.is_empty());
    let gateway = Ns1Gateway::new(api_key, endpoint)?;

    probe_with(&gateway, rounds).await
}

#[cfg(feature = "ns1")]
async fn probe_with(gateway: &dnsm_provider_ns1::Ns1Gateway, rounds: u32) -> anyhow::Result<()> {
    let reply = gateway.list_zones().await?;
    if !reply.is_success() {
        anyhow::bail!("{}: {}", reply.status, reply.body.trim());
    }
    let zones = match reply.entity {
        Some(zones) => zones,
        None if reply.body.trim().is_empty() => Vec::new(),
        None => return Err(Error::provider("ns1", "could not decode zone list").into()),
    };
    for zone in zones {
        println!("{}", zone.name());
    }

    let started = Instant::now();
    tracing::info!("Starting benchmark: {} list calls", rounds);
    for _ in 0..rounds {
        let reply = gateway.list_zones().await?;
        if !reply.is_success() {
            anyhow::bail!("{}: {}", reply.status, reply.body.trim());
        }
    }
    let elapsed = started.elapsed();
    tracing::info!("Done benchmark: {} calls in {:?}", rounds, elapsed);
    println!("{} list calls took {:?}", rounds, elapsed);

    Ok(())
}

#[cfg(not(feature = "ns1"))]
pub async fn probe(_rounds: u32) -> anyhow::Result<()> {
    Err(Error::config("dns-manager was built without NS1 support").into())
}
