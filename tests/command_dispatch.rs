//! Command front end and configuration tests

use contigalloc::{
    AllocError, AllocatorConfig, ContiguousAllocator, Dispatcher, MemoryManager, SharedAllocator,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn run_script<M: MemoryManager>(manager: M, script: &str) -> (String, M) {
    let mut dispatcher = Dispatcher::new(manager);
    let mut out = Vec::new();
    dispatcher.run(script.as_bytes(), &mut out, None).unwrap();
    (String::from_utf8(out).unwrap(), dispatcher.into_manager())
}

#[test]
fn test_script_session() {
    let script = "\
RQ P0 262144 B
RQ P1 262144 F
RQ P2 262200 W
RL P1
RQ P3 200000 B
STAT
C
STAT
X
";
    let (out, _) = run_script(ContiguousAllocator::new(1_048_576).unwrap(), script);

    let expected = "\
Addresses [0:262143] Process P0
Addresses [262144:524287] Unused
Addresses [524288:786487] Process P2
Addresses [786488:986487] Process P3
Addresses [986488:1048575] Unused
Memory compacted.
Addresses [0:262143] Process P0
Addresses [262144:524343] Process P2
Addresses [524344:724343] Process P3
Addresses [724344:1048575] Unused
Exiting allocator.
";
    assert_eq!(out, expected);
}

#[test]
fn test_errors_do_not_stop_the_session() {
    let script = "\
RQ P1 100
bogus
RQ P1 100 F
RQ P1 100 F
RL P2
STAT
";
    let (out, alloc) = run_script(ContiguousAllocator::new(1024).unwrap(), script);

    let expected = "\
Error: RQ command requires exactly 3 parameters.
Error: Unknown command. Valid commands are RQ, RL, C, STAT, X.
Error: Process P1 already has memory allocated.
Error: Process P2 does not have memory allocated.
Addresses [0:99] Process P1
Addresses [100:1023] Unused
";
    assert_eq!(out, expected);
    alloc.validate().unwrap();
}

#[test]
fn test_long_process_names_are_accepted() {
    let name = "worker".repeat(20);
    let script = format!("RQ {name} 64 W\nSTAT\nRL {name}\nSTAT\n");
    let (out, alloc) = run_script(ContiguousAllocator::new(256).unwrap(), &script);

    let expected = format!(
        "Addresses [0:63] Process {name}\n\
         Addresses [64:255] Unused\n\
         Addresses [0:255] Unused\n"
    );
    assert_eq!(out, expected);
    assert!(!alloc.contains(&name));
}

#[test]
fn test_dispatch_through_shared_handle() {
    let shared = SharedAllocator::new(1024).unwrap();
    let observer = shared.clone();

    let (out, _) = run_script(shared, "RQ A 512 W\nRQ B 512 W\nRQ C 1 F\n");

    assert_eq!(out, "Error: Not enough memory for allocation request.\n");
    assert_eq!(observer.stats().used, 1024);
    assert_eq!(observer.report().blocks.len(), 2);
}

#[test]
fn test_config_file_loading() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "capacity = 2048").unwrap();
    writeln!(file, "prompt = \"mem> \"").unwrap();
    writeln!(file, "json_status = true").unwrap();

    let config = AllocatorConfig::load(file.path()).unwrap();
    assert_eq!(config.capacity, 2048);
    assert_eq!(config.prompt, "mem> ");
    assert!(config.json_status);

    let alloc = ContiguousAllocator::new(config.capacity).unwrap();
    let mut dispatcher = Dispatcher::new(alloc).with_json_status(config.json_status);
    let mut out = Vec::new();
    dispatcher
        .run("STAT\n".as_bytes(), &mut out, Some(config.prompt.as_str()))
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("mem> {"));
    assert!(text.contains("\"capacity\": 2048"));
}

#[test]
fn test_config_file_errors() {
    assert!(matches!(
        AllocatorConfig::load("/definitely/not/here.toml"),
        Err(AllocError::Io(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "capacity = \"lots\"").unwrap();
    assert!(matches!(
        AllocatorConfig::load(file.path()),
        Err(AllocError::Toml(_))
    ));
}
