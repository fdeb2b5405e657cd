//! End-to-end tests: configuration, system assembly and trace replay.

use cachesim::common::{AccessType, ConfigError};
use cachesim::config::{Config, Geometry, ReplacementPolicy};
use cachesim::sim::{self, TraceOp};
use cachesim::soc::memory::MemoryController;
use cachesim::soc::{Downstream, System};

const SPLIT_L1_CONFIG: &str = r#"
[[cache]]
name = "I$"
geometry = "64:2:64"
next = "L2$"

[[cache]]
name = "D$"
geometry = "64:2:64"
policy = "Lfu"
next = "L2$"

[[cache]]
name = "L2$"
geometry = "1:8:64"
next = "memory"

[ports]
icache = "I$"
dcache = "D$"
"#;

fn create_test_system(toml: &str) -> System {
    System::new(&Config::from_toml(toml).unwrap()).unwrap()
}

fn run(system: &mut System, trace: &str) -> sim::ReplaySummary {
    sim::replay(system, sim::read_trace(trace.as_bytes())).unwrap()
}

/// Tests system assembly from a TOML description.
#[test]
fn test_system_from_toml() {
    let system = create_test_system(SPLIT_L1_CONFIG);
    let h = &system.hierarchy;

    let ic = system.icache.unwrap();
    let dc = system.dcache.unwrap();
    let l2 = h.find("L2$").unwrap();

    assert_eq!(h.len(), 3);
    assert_eq!(h.level(ic).name(), "I$");
    assert_eq!(h.level(dc).policy(), ReplacementPolicy::Lfu);
    assert!(h.level(l2).is_sparse());
    assert_eq!(h.next_of(ic), Some(Downstream::Level(l2)));
    assert_eq!(h.next_of(l2), Some(Downstream::Memory));
}

/// Tests that fetches and data accesses enter through their own ports.
#[test]
fn test_port_routing() {
    let mut system = create_test_system(SPLIT_L1_CONFIG);
    let summary = run(&mut system, "x 0x1000 4\nr 0x2000 8\nw 0x2000 8\n");

    assert_eq!(summary.accesses, 3);
    let h = &system.hierarchy;
    let ic = h.level(system.icache.unwrap()).stats();
    let dc = h.level(system.dcache.unwrap()).stats();
    assert_eq!(ic.read_accesses, 1);
    assert_eq!(ic.write_accesses, 0);
    assert_eq!(dc.read_accesses, 1);
    assert_eq!(dc.write_accesses, 1);
    assert_eq!(dc.write_misses, 0);

    let l2 = h.level(h.find("L2$").unwrap()).stats();
    assert_eq!(l2.read_accesses, 2);
    assert_eq!(l2.bytes_read, 128);
}

/// Tests that an access to an unconfigured port is dropped.
#[test]
fn test_unconfigured_port_drops() {
    let mut system = create_test_system(
        r#"
        [[cache]]
        name = "D$"
        geometry = "16:1:64"
        "#,
    );
    assert!(system.icache.is_none());
    assert!(system.dcache.is_some());

    assert!(system.access(AccessType::Fetch, 0x0, 4).is_none());
    let summary = run(&mut system, "x 0x0\nr 0x0\n");
    assert_eq!(summary.accesses, 1);
    assert_eq!(summary.dropped, 1);
}

/// Tests the direct-mapped read-then-store trace.
#[test]
fn test_read_then_store_trace() {
    let config = Config::from_geometries(
        None,
        Some("1024:1:64".parse().unwrap()),
        None,
        ReplacementPolicy::Random,
        1,
    );
    let mut system = System::new(&config).unwrap();
    run(&mut system, "r 0x80001234 4\nw 0x80001234 4\n");

    let dc = system.hierarchy.level(system.dcache.unwrap());
    assert_eq!(dc.stats().read_misses, 1);
    assert_eq!(dc.stats().write_accesses, 1);
    assert_eq!(dc.stats().write_misses, 0);
    let line = dc.line(0x80001234).unwrap();
    assert!(line.valid && line.dirty);

    let mem = system.hierarchy.memory().stats();
    assert_eq!(mem.reads, 1);
    assert_eq!(mem.bytes_read, 64);
}

/// Tests the pinned-seed fully-associative eviction through the whole stack.
#[test]
fn test_fully_associative_trace() {
    let config = Config::from_geometries(
        None,
        Some("1:8:64".parse().unwrap()),
        None,
        ReplacementPolicy::Random,
        1,
    );
    let mut system = System::new(&config).unwrap();
    let trace: String = (0..9).map(|i| format!("r {:#x}\n", i * 0x40)).collect();
    run(&mut system, &trace);

    let dc = system.hierarchy.level(system.dcache.unwrap());
    assert!(dc.is_sparse());
    assert_eq!(dc.resident_lines(), 8);
    assert!(!dc.contains(0x40));
    assert_eq!(dc.stats().read_misses, 9);
}

/// Tests maintenance operations flowing through both ports.
#[test]
fn test_flush_trace() {
    let mut system = create_test_system(SPLIT_L1_CONFIG);
    let summary = run(
        &mut system,
        "x 0x1000 4\nw 0x1000 8\n# drop everything\nflush 0x1000 64\n",
    );
    assert_eq!(summary.maintenance, 1);

    let h = &system.hierarchy;
    let dc = h.level(system.dcache.unwrap());
    assert!(!dc.contains(0x1000));
    assert_eq!(dc.stats().writebacks, 1);
    assert!(!h.level(system.icache.unwrap()).contains(0x1000));
    assert!(!h.level(h.find("L2$").unwrap()).contains(0x1000));
}

/// Tests that replay stops at the first malformed line.
#[test]
fn test_replay_reports_bad_line() {
    let mut system = create_test_system(SPLIT_L1_CONFIG);
    let err = sim::replay(&mut system, sim::read_trace("r 0x0\nbogus 0x0\nr 0x40\n".as_bytes()))
        .unwrap_err();
    assert!(err.to_string().contains("line 2"));
    assert_eq!(system.report().levels[1].stats.read_accesses, 1);
}

/// Tests replay of already-parsed operations.
#[test]
fn test_replay_ops() {
    let mut system = create_test_system(SPLIT_L1_CONFIG);
    let ops = vec![
        Ok(TraceOp::Access {
            kind: AccessType::Write,
            addr: 0x40,
            bytes: 8,
        }),
        Ok(TraceOp::CleanInvalidate {
            addr: 0x40,
            bytes: 8,
            clean: true,
            inval: false,
        }),
    ];
    let summary = sim::replay(&mut system, ops).unwrap();
    assert_eq!(summary.accesses, 1);
    assert_eq!(summary.maintenance, 1);

    let dc = system.hierarchy.level(system.dcache.unwrap());
    assert!(!dc.line(0x40).unwrap().dirty);
}

/// Tests configuration errors surfaced while assembling a system.
#[test]
fn test_system_config_errors() {
    let empty = Config::from_geometries(None, None, None, ReplacementPolicy::Random, 1);
    assert!(matches!(System::new(&empty), Err(ConfigError::Empty)));

    let unknown = Config::from_toml(
        r#"
        [[cache]]
        name = "L1"
        geometry = "4:1:16"
        next = "L3"
        "#,
    )
    .unwrap();
    assert!(matches!(System::new(&unknown), Err(ConfigError::UnknownLevel(_))));

    let cycle = Config::from_toml(
        r#"
        [[cache]]
        name = "A"
        geometry = "4:1:16"
        next = "B"

        [[cache]]
        name = "B"
        geometry = "4:1:16"
        next = "A"
        "#,
    )
    .unwrap();
    assert!(matches!(System::new(&cycle), Err(ConfigError::LinkCycle(_, _))));

    let memory_port = Config::from_toml(
        r#"
        [[cache]]
        name = "L1"
        geometry = "4:1:16"

        [ports]
        dcache = "memory"
        "#,
    )
    .unwrap();
    assert!(matches!(System::new(&memory_port), Err(ConfigError::UnknownLevel(_))));

    let zero_seed = Config::from_toml(
        r#"
        [[cache]]
        name = "L1"
        geometry = "4:1:16"
        seed = 0
        "#,
    )
    .unwrap();
    assert!(matches!(System::new(&zero_seed), Err(ConfigError::ZeroSeed)));
}

/// Tests geometry validation messages.
#[test]
fn test_geometry_errors() {
    assert!(matches!("3:1:64".parse::<Geometry>(), Err(ConfigError::InvalidSets(3))));
    assert!(matches!("4:0:64".parse::<Geometry>(), Err(ConfigError::InvalidWays(0))));
    assert!(matches!("4:1:4".parse::<Geometry>(), Err(ConfigError::InvalidLineSize(4))));
    assert!(matches!("4:1".parse::<Geometry>(), Err(ConfigError::Malformed(_))));
}

/// Tests the text and JSON reports of a run.
#[test]
fn test_report_output() {
    let mut system = create_test_system(SPLIT_L1_CONFIG);
    run(&mut system, "r 0x0 8\nr 0x0 8\n");
    let report = system.report();

    let mut buf = Vec::new();
    report.write_text(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("D$ Read Accesses:         2"));
    assert!(text.contains("D$ Miss Rate:             50.000%"));
    assert!(!text.contains("I$"));
    assert!(text.contains("Memory Reads:"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["levels"][1]["name"], "D$");
    assert_eq!(json["levels"][1]["read_misses"], 1);
    assert_eq!(json["memory"]["reads"], 1);
}
