//! 工具函数与注册表性能基准测试

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pocketlink::config::ShortenerConfig;
use pocketlink::logging::EventLog;
use pocketlink::services::CodeRegistry;
use pocketlink::storage::MemoryStore;
use pocketlink::utils::url_validator::validate_url;
use pocketlink::utils::{generate_random_code, is_valid_short_code};

// ============== is_valid_short_code 基准测试 ==============

fn bench_is_valid_short_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/is_valid_short_code");

    group.bench_function("valid_simple", |b| {
        b.iter(|| {
            assert!(is_valid_short_code("abc123"));
        });
    });

    group.bench_function("valid_with_separators", |b| {
        b.iter(|| {
            assert!(is_valid_short_code("my-link_2024"));
        });
    });

    // 无效短码
    group.bench_function("invalid_too_short", |b| {
        b.iter(|| {
            assert!(!is_valid_short_code("abc"));
        });
    });

    group.bench_function("invalid_special_chars", |b| {
        b.iter(|| {
            assert!(!is_valid_short_code("'; DROP TABLE--"));
        });
    });

    let long_code = "a".repeat(256);
    group.bench_function("valid_long", |b| {
        b.iter(|| {
            assert!(is_valid_short_code(&long_code));
        });
    });

    group.finish();
}

// ============== generate_random_code 基准测试 ==============

fn bench_generate_random_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/generate_random_code");

    for length in [6, 8, 12] {
        group.bench_with_input(BenchmarkId::new("length", length), &length, |b, &length| {
            b.iter(|| {
                let code = generate_random_code(length);
                assert_eq!(code.len(), length);
            });
        });
    }

    group.finish();
}

// ============== validate_url 基准测试 ==============

fn bench_validate_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/validate_url");

    group.bench_function("valid_https", |b| {
        b.iter(|| {
            assert!(validate_url("https://example.com/path?query=1").is_ok());
        });
    });

    group.bench_function("valid_custom_scheme", |b| {
        b.iter(|| {
            assert!(validate_url("mailto:someone@example.com").is_ok());
        });
    });

    group.bench_function("invalid_no_scheme", |b| {
        b.iter(|| {
            assert!(validate_url("not a url").is_err());
        });
    });

    group.bench_function("invalid_empty", |b| {
        b.iter(|| {
            assert!(validate_url("").is_err());
        });
    });

    let long_url = format!("https://example.com/{}", "a".repeat(1000));
    group.bench_function("valid_long_url", |b| {
        b.iter(|| {
            assert!(validate_url(&long_url).is_ok());
        });
    });

    group.finish();
}

// ============== CodeRegistry 基准测试 ==============

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    // 每次写入都会重新读取整个集合，集合越大越慢
    for existing in [0usize, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("create_short_url", existing),
            &existing,
            |b, &existing| {
                let registry = CodeRegistry::new(
                    Arc::new(MemoryStore::new()),
                    EventLog::discard(),
                    ShortenerConfig::default(),
                );
                for _ in 0..existing {
                    registry
                        .create_short_url("https://example.com", None, None)
                        .unwrap();
                }
                b.iter(|| {
                    registry
                        .create_short_url("https://example.com/bench", Some(5.0), None)
                        .unwrap();
                });
            },
        );
    }

    let registry = CodeRegistry::new(
        Arc::new(MemoryStore::new()),
        EventLog::discard(),
        ShortenerConfig::default(),
    );
    for i in 0..500 {
        registry
            .create_short_url("https://example.com", None, Some(&format!("code{}", i)))
            .unwrap();
    }
    group.bench_function("get_url_hit", |b| {
        b.iter(|| {
            assert!(registry.get_url("code250").is_some());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_is_valid_short_code,
    bench_generate_random_code,
    bench_validate_url,
    bench_registry,
);
criterion_main!(benches);
