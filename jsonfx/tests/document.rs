use std::io::Write;

use insta::assert_snapshot;
use jsonfx::{
    AllocErrorKind, BigAllocPolicy, ChunkedPool, DefaultPool, Document, DocumentError, FastPool,
    FileStream, HoistedPool, Number, PassthroughPool, PoolAllocator, PoolConfig, SystemAllocator,
    Visitor,
};
use jsonfx_testhelpers::TestResult;

const SAMPLE: &str = r#"{
    "name": "jsonfx",
    "pools": ["chunked", "hoisted", "fast"],
    "chunk": {"capacity": 65536, "header": 32},
    "ratio": 0.75,
    "stable": false,
    "notes": null
}"#;

#[test]
fn parse_builds_the_whole_tree() -> TestResult {
    jsonfx_testhelpers::setup();
    let pool = ChunkedPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    doc.parse(SAMPLE)?;

    assert!(doc.is_object());
    assert_eq!(doc.member_count(), 6);
    assert_eq!(doc["name"], "jsonfx");
    assert_eq!(doc["pools"].size(), 3);
    assert_eq!(doc["pools"][2], "fast");
    assert_eq!(doc["chunk"]["capacity"].get_int(), 65536);
    assert_eq!(doc["ratio"].get_double(), 0.75);
    assert!(doc["stable"].is_false());
    assert!(doc["notes"].is_null());
    assert!(!doc.has_member("missing"));
    assert_eq!(pool.chunk_count(), 1);
    Ok(())
}

#[test]
fn parsed_debug_output() -> TestResult {
    let pool = FastPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    doc.parse(SAMPLE)?;
    assert_snapshot!(format!("{doc:#?}"), @r#"
    {
        "name": "jsonfx",
        "pools": [
            "chunked",
            "hoisted",
            "fast",
        ],
        "chunk": {
            "capacity": 65536,
            "header": 32,
        },
        "ratio": 0.75,
        "stable": false,
        "notes": null,
    }
    "#);
    Ok(())
}

#[test]
fn every_pool_parses_the_same_tree() -> TestResult {
    let chunked = ChunkedPool::<SystemAllocator>::new();
    let hoisted = HoistedPool::<SystemAllocator>::new();
    let fast = FastPool::<SystemAllocator>::new();
    let passthrough = PassthroughPool::<SystemAllocator>::new();

    let mut a = Document::new(&chunked);
    let mut b = Document::new(&hoisted);
    let mut c = Document::new(&fast);
    let mut d = Document::new(&passthrough);
    a.parse(SAMPLE)?;
    b.parse(SAMPLE)?;
    c.parse(SAMPLE)?;
    d.parse(SAMPLE)?;

    assert_eq!(*a, *b);
    assert_eq!(*a, *c);
    assert_eq!(*a, *d);
    Ok(())
}

#[test]
fn small_chunks_grow_the_pool() -> TestResult {
    jsonfx_testhelpers::setup();
    // The array outgrows a chunk, so it needs the big allocation path.
    let pool = HoistedPool::<SystemAllocator>::with_config(
        PoolConfig::new()
            .with_chunk_capacity(256)
            .with_big_alloc(BigAllocPolicy::Enabled),
    );
    let mut doc = Document::new(&pool);
    let text = format!(
        "[{}]",
        (0..200)
            .map(|i| format!("\"entry number {i:04}\""))
            .collect::<Vec<_>>()
            .join(",")
    );
    doc.parse(&text)?;
    assert_eq!(doc.size(), 200);
    assert_eq!(doc[199], "entry number 0199");
    assert!(pool.chunk_count() > 1);
    assert!(pool.stats().big_chunk_count > 0);
    Ok(())
}

fn long_array() -> String {
    format!("[{}]", vec!["1"; 3000].join(","))
}

fn long_string() -> String {
    format!("\"{}\"", "y".repeat(70_000))
}

#[test]
fn default_pool_reports_nodes_larger_than_a_chunk() -> TestResult {
    jsonfx_testhelpers::setup();
    let pool = DefaultPool::new();
    let mut doc = Document::new(&pool);
    doc.parse(r#"{"kept": true}"#)?;

    for text in [long_array(), long_string()] {
        let err = doc.parse(&text).unwrap_err();
        let DocumentError::Alloc(refused) = err else {
            panic!("expected an allocation error, got {err}");
        };
        assert!(matches!(refused.kind, AllocErrorKind::Oversized { .. }));
        assert!(doc["kept"].is_true());
    }
    Ok(())
}

#[test]
fn big_allocations_parse_long_arrays_and_strings() -> TestResult {
    let pool = DefaultPool::with_config(PoolConfig::new().with_big_alloc(BigAllocPolicy::Enabled));
    let mut doc = Document::new(&pool);

    doc.parse(&long_array())?;
    assert_eq!(doc.size(), 3000);
    assert_eq!(doc[2999].get_int(), 1);

    doc.parse(&long_string())?;
    assert_eq!(doc.get_string_length(), 70_000);
    assert!(pool.stats().big_chunk_count >= 2);
    Ok(())
}

#[test]
fn allocation_error_display() {
    let pool = ChunkedPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    let err = doc.parse(&long_string()).unwrap_err();
    assert_snapshot!(err.to_string(), @"pool refused an allocation: allocation of 70000 bytes exceeds the chunk limit of 65504 bytes (big allocations are disabled)");
}

#[test]
fn parse_stream_reads_the_rest_of_the_file() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"garbage[1, 2, 3]")?;
    let mut stream = FileStream::open(file.path())?;
    stream.skip(7)?;

    let pool = ChunkedPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    doc.parse_stream(&mut stream)?;
    assert_eq!(doc.size(), 3);
    assert_eq!(stream.available(), 0);
    Ok(())
}

#[test]
fn parse_stream_rejects_invalid_utf8() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"\"ok\xff\"")?;
    let mut stream = FileStream::open(file.path())?;

    let pool = ChunkedPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    let err = doc.parse_stream(&mut stream).unwrap_err();
    assert!(matches!(err, DocumentError::NotUtf8 { valid_up_to: 3 }), "{err}");
    Ok(())
}

#[test]
fn parse_errors_display() {
    let pool = ChunkedPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    let err = doc.parse("{\"a\": }").unwrap_err();
    assert_snapshot!(err.to_string(), @"invalid JSON: expected value at line 1 column 7");
    assert_snapshot!(doc.parse("").unwrap_err().to_string(), @"input is empty");
}

/// Counts nodes and sums every number.
#[derive(Default)]
struct Census {
    nodes: usize,
    keys: usize,
    sum: f64,
}

impl Visitor for Census {
    type Error = core::convert::Infallible;

    fn visit_null(&mut self) -> Result<(), Self::Error> {
        self.nodes += 1;
        Ok(())
    }

    fn visit_bool(&mut self, _v: bool) -> Result<(), Self::Error> {
        self.nodes += 1;
        Ok(())
    }

    fn visit_number(&mut self, n: Number) -> Result<(), Self::Error> {
        self.nodes += 1;
        self.sum += n.to_f64();
        Ok(())
    }

    fn visit_string(&mut self, _s: &str) -> Result<(), Self::Error> {
        self.nodes += 1;
        Ok(())
    }

    fn start_array(&mut self, _len: usize) -> Result<(), Self::Error> {
        self.nodes += 1;
        Ok(())
    }

    fn start_object(&mut self, _len: usize) -> Result<(), Self::Error> {
        self.nodes += 1;
        Ok(())
    }

    fn visit_key(&mut self, _name: &str) -> Result<(), Self::Error> {
        self.keys += 1;
        Ok(())
    }
}

#[test]
fn visit_walks_every_node() -> TestResult {
    let pool = FastPool::<SystemAllocator>::new();
    let mut doc = Document::new(&pool);
    doc.parse(SAMPLE)?;

    let mut census = Census::default();
    let Ok(()) = doc.visit(&mut census);
    // root, name, pools + 3, chunk + 2, ratio, stable, notes
    assert_eq!(census.nodes, 12);
    assert_eq!(census.keys, 8);
    assert_eq!(census.sum, 65536.0 + 32.0 + 0.75);
    Ok(())
}

#[test]
fn default_pool_document() {
    let names = Document::<FastPool>::with_default_pool(|doc| {
        doc.parse(SAMPLE).unwrap();
        doc.get_member_begin().map(|m| m.name_str().len()).sum::<usize>()
    });
    assert_eq!(names, "namepoolschunkratiostablenotes".len());
}

#[test]
fn allocator_is_the_backing_pool() {
    let pool = ChunkedPool::<SystemAllocator>::new();
    let doc = Document::new(&pool);
    assert!(core::ptr::eq(doc.allocator(), &pool));
    assert_eq!(doc.allocator().stats().bytes_used, 0);
}
