//! Performance benchmarks for the hot paths of a probe run
//!
//! Statistics updates, address ordering and line rendering run once per
//! attempt, so they should stay far below the probe latencies they report.

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use portping::{
    cli::Cli,
    config::ConfigParser,
    dns::{filter_addresses, sort_addresses},
    models::{Address, AttemptReport, RunSummary},
    output::OutputFormatterFactory,
    probe::ProbeError,
    stats::{update, Stats, StatsTable},
    types::{Protocol, RunState},
    ProbeOutcome,
};
use std::hint::black_box;
use std::net::IpAddr;
use std::time::Duration;

fn sample_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                format!("2001:db8::{:x}", i).parse().unwrap()
            } else {
                format!("10.{}.{}.{}", i / 65536 % 256, i / 256 % 256, i % 256).parse().unwrap()
            }
        })
        .collect()
}

fn sample_outcomes(count: usize) -> Vec<ProbeOutcome> {
    (0..count)
        .map(|i| {
            let duration = Duration::from_micros(500 + (i as u64 * 37) % 20_000);
            if i % 10 == 0 {
                ProbeOutcome::failure(duration, ProbeError::Timeout)
            } else {
                ProbeOutcome::success(duration)
            }
        })
        .collect()
}

fn benchmark_stats_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats_update");

    for size in [100usize, 1_000, 10_000] {
        let outcomes = sample_outcomes(size);
        group.bench_with_input(BenchmarkId::new("single_address", size), &outcomes, |b, outcomes| {
            b.iter(|| {
                let mut stats = Stats::new();
                for outcome in outcomes {
                    update(&mut stats, outcome.duration, outcome.error.as_ref());
                }
                black_box(stats.average())
            })
        });
    }

    let addresses = filter_addresses(sample_ips(16), true, true);
    let outcomes = sample_outcomes(1_600);
    group.bench_function("table_16_addresses", |b| {
        b.iter(|| {
            let mut table = StatsTable::new(&addresses);
            for (i, outcome) in outcomes.iter().enumerate() {
                table.record(&addresses[i % addresses.len()].value, outcome);
            }
            black_box(table.summary_rows())
        })
    });

    group.finish();
}

fn benchmark_address_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("address_ordering");

    for size in [4usize, 64, 512] {
        let ips = sample_ips(size);
        group.bench_with_input(BenchmarkId::new("filter_and_sort", size), &ips, |b, ips| {
            b.iter(|| {
                let mut addresses = filter_addresses(ips.clone(), true, true);
                sort_addresses(&mut addresses);
                black_box(addresses)
            })
        });
    }

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    let report = AttemptReport {
        round: 42,
        sub_index: Some(2),
        address: "2001:db8::1".to_string(),
        address_width: 15,
        duration: Duration::from_micros(12_345),
        error: None,
    };
    let failed = AttemptReport {
        error: Some(ProbeError::Timeout),
        ..report.clone()
    };

    for (name, enable_color) in [("plain", false), ("colored", true)] {
        let formatter = OutputFormatterFactory::create_formatter(enable_color, false);
        group.bench_function(format!("attempt_{}", name), |b| {
            b.iter(|| black_box(formatter.format_attempt(&report)))
        });
        group.bench_function(format!("failed_attempt_{}", name), |b| {
            b.iter(|| black_box(formatter.format_attempt(&failed)))
        });
    }

    let addresses = filter_addresses(sample_ips(8), true, true);
    let mut table = StatsTable::new(&addresses);
    for (i, outcome) in sample_outcomes(800).iter().enumerate() {
        table.record(&addresses[i % addresses.len()].value, outcome);
    }
    let summary = RunSummary {
        host: "bench.example".to_string(),
        protocol: Protocol::Tcp,
        port: 443,
        state: RunState::Completed,
        rounds_completed: 100,
        rows: table.summary_rows(),
        address_width: addresses.iter().map(|a| a.value.len()).max().unwrap_or(0),
        elapsed: Duration::from_secs(100),
    };
    let formatter = OutputFormatterFactory::create_plain_formatter();
    group.bench_function("summary_8_rows", |b| {
        b.iter(|| black_box(formatter.format_summary(&summary)))
    });

    group.finish();
}

fn benchmark_config_parsing(c: &mut Criterion) {
    c.bench_function("config_parsing", |b| {
        b.iter(|| {
            let cli = Cli::parse_from(["portping", "--no-color", "-c", "5", "--dns", "[2001:db8::1]:5353"]);
            black_box(ConfigParser::new(cli).parse())
        })
    });
}

fn benchmark_address_construction(c: &mut Criterion) {
    let ips = sample_ips(256);
    c.bench_function("address_new_256", |b| {
        b.iter(|| ips.iter().map(|ip| Address::new(*ip)).collect::<Vec<_>>())
    });
}

criterion_group!(
    benches,
    benchmark_stats_update,
    benchmark_address_ordering,
    benchmark_rendering,
    benchmark_config_parsing,
    benchmark_address_construction,
);

criterion_main!(benches);
