// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background rDNS and ASN resolvers. Both run behind request/reply queues
//! so the UI loop never blocks on network I/O; failures are cached (ASN)
//! or simply mark the field unresolved (rDNS) and are retried later.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// How long a failed ASN lookup is cached before being retried.
pub const ASN_FAILURE_TTL_SECS: f64 = 300.0;

#[derive(Debug, Clone, Copy)]
pub struct AsnCacheEntry {
    pub value: Option<u32>,
    pub fetched_at: f64,
}

/// Whether a cached ASN entry should be retried given the current time.
/// A successful entry is never retried; a failed one is retried once
/// `failure_ttl` seconds have elapsed since it was fetched.
pub fn should_retry_asn(entry: Option<&AsnCacheEntry>, now: f64, failure_ttl: f64) -> bool {
    match entry {
        None => true,
        Some(e) if e.value.is_some() => false,
        Some(e) => now - e.fetched_at >= failure_ttl,
    }
}

/// Parse a Team Cymru whois `-v` response into an AS number.
/// Response is pipe-delimited, one header line then one line per query.
/// Example data line: ` 15169   | 8.8.8.8          | 8.8.8.0/24          | US | ...`
pub fn parse_asn_response(response: &str) -> Option<u32> {
    let data_line = response.lines().nth(1)?;
    let first_field = data_line.split('|').next()?.trim();
    if first_field.eq_ignore_ascii_case("NA") || first_field.is_empty() {
        return None;
    }
    first_field
        .strip_prefix("AS")
        .unwrap_or(first_field)
        .parse::<u32>()
        .ok()
}

/// Query `whois.cymru.com:43` for `ip`'s originating ASN.
pub async fn fetch_asn_via_whois(ip: IpAddr) -> Option<u32> {
    let stream = TcpStream::connect(("whois.cymru.com", 43)).await.ok()?;
    resolve_asn_over(stream, ip).await
}

async fn resolve_asn_over(mut stream: TcpStream, ip: IpAddr) -> Option<u32> {
    let query = format!(" -v {ip}\n");
    stream.write_all(query.as_bytes()).await.ok()?;

    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];
    loop {
        if buf.len() >= 65_536 {
            break;
        }
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }

    let response = String::from_utf8_lossy(&buf);
    parse_asn_response(&response)
}

/// Reverse-DNS lookup via the OS resolver. Blocking, so it's run on the
/// blocking thread pool rather than inline.
pub async fn resolve_rdns(ip: IpAddr) -> Option<String> {
    tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip).ok())
        .await
        .ok()
        .flatten()
}

/// A resolved ASN, keyed by request order, used by the UI loop to update
/// `host_infos` without blocking on the resolver itself.
#[derive(Debug, Clone)]
pub struct AsnReply {
    pub host_id: usize,
    pub asn: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RdnsReply {
    pub host_id: usize,
    pub name: Option<String>,
}

/// Spawn the ASN resolver worker: consumes `(host_id, ip)` requests,
/// produces [`AsnReply`]s. Exits when the request channel closes.
pub fn spawn_asn_worker(
    mut requests: mpsc::UnboundedReceiver<(usize, IpAddr)>,
    replies: mpsc::UnboundedSender<AsnReply>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((host_id, ip)) = requests.recv().await {
            let asn = tokio::time::timeout(Duration::from_secs(5), fetch_asn_via_whois(ip))
                .await
                .unwrap_or(None);
            if replies.send(AsnReply { host_id, asn }).is_err() {
                break;
            }
        }
    })
}

/// Spawn the rDNS resolver worker: consumes `(host_id, ip)` requests,
/// produces [`RdnsReply`]s. Exits when the request channel closes.
pub fn spawn_rdns_worker(
    mut requests: mpsc::UnboundedReceiver<(usize, IpAddr)>,
    replies: mpsc::UnboundedSender<RdnsReply>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((host_id, ip)) = requests.recv().await {
            let name = tokio::time::timeout(Duration::from_secs(5), resolve_rdns(ip))
                .await
                .unwrap_or(None);
            if replies.send(RdnsReply { host_id, name }).is_err() {
                break;
            }
        }
    })
}

/// In-memory ASN cache keyed by host id, with failure-TTL retry.
#[derive(Debug, Default)]
pub struct AsnCache {
    entries: HashMap<usize, AsnCacheEntry>,
}

impl AsnCache {
    pub fn get(&self, host_id: usize) -> Option<&AsnCacheEntry> {
        self.entries.get(&host_id)
    }

    pub fn set(&mut self, host_id: usize, value: Option<u32>, now: f64) {
        self.entries.insert(host_id, AsnCacheEntry { value, fetched_at: now });
    }

    pub fn needs_retry(&self, host_id: usize, now: f64) -> bool {
        should_retry_asn(self.entries.get(&host_id), now, ASN_FAILURE_TTL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cymru_response() {
        let resp = "AS      | IP               | BGP Prefix          | CC | Registry | Allocated  | AS Name\n15169   | 8.8.8.8          | 8.8.8.0/24          | US | arin     | 1992-12-01 | GOOGLE\n";
        assert_eq!(parse_asn_response(resp), Some(15169));
    }

    #[test]
    fn parses_na_as_none() {
        let resp = "AS | IP | BGP Prefix | CC\nNA      | 10.0.0.1 | NA | NA\n";
        assert_eq!(parse_asn_response(resp), None);
    }

    #[test]
    fn failed_entry_retried_after_ttl() {
        let entry = AsnCacheEntry {
            value: None,
            fetched_at: 0.0,
        };
        assert!(!should_retry_asn(Some(&entry), 100.0, 300.0));
        assert!(should_retry_asn(Some(&entry), 301.0, 300.0));
    }

    #[test]
    fn successful_entry_never_retried() {
        let entry = AsnCacheEntry {
            value: Some(15169),
            fetched_at: 0.0,
        };
        assert!(!should_retry_asn(Some(&entry), 1_000_000.0, 300.0));
    }

    #[test]
    fn missing_entry_always_retried() {
        assert!(should_retry_asn(None, 0.0, 300.0));
    }

    #[test]
    fn asn_cache_tracks_retry_policy() {
        let mut cache = AsnCache::default();
        assert!(cache.needs_retry(0, 0.0));
        cache.set(0, None, 0.0);
        assert!(!cache.needs_retry(0, 100.0));
        assert!(cache.needs_retry(0, 301.0));
    }
}
