//! Process-wide cache of parsed quantity formats
//!
//! Entries are never evicted. Each key owns a `OnceLock` cell: the first
//! caller computes the format, concurrent callers for the same key block on
//! the cell and share the result, and later callers read it without locking
//! a shard for writing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use dashmap::DashMap;
use crate::format::{parse_format, QuantityFormat};
use crate::{QuantityKind, SymbolFormat, Unit, UnitRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Composite {
        kind: QuantityKind,
        format: Option<String>,
    },
    ForUnit {
        value_format: Option<String>,
        unit: Unit,
        symbol_format: SymbolFormat,
    },
}

type Cell = Arc<OnceLock<Arc<QuantityFormat>>>;

/// Append-only map from format requests to parsed formats
#[derive(Debug, Default)]
pub struct FormatCache {
    entries: DashMap<CacheKey, Cell>,
    computations: AtomicUsize,
}

impl FormatCache {
    pub fn new() -> Self {
        FormatCache::default()
    }

    /// Parsed format for `kind`; a format that fails to parse is cached as an
    /// invalid format carrying its error.
    ///
    /// Keys do not name the registry, so only the owning registry may call
    /// this, through [`UnitRegistry::format`].
    pub(crate) fn get_or_create(&self, registry: &UnitRegistry, kind: QuantityKind, format: Option<&str>) -> Arc<QuantityFormat> {
        let key = CacheKey::Composite {
            kind,
            format: format.map(str::to_string),
        };
        self.resolve(key, || {
            parse_format(registry, kind, format)
                .unwrap_or_else(|err| QuantityFormat::invalid(registry.si_unit(kind), err))
        })
    }

    /// Format for an explicit unit, value format and symbol notation
    pub fn get_or_create_for_unit(
        &self,
        value_format: Option<&str>,
        unit: Unit,
        symbol_format: SymbolFormat,
    ) -> Arc<QuantityFormat> {
        let key = CacheKey::ForUnit {
            value_format: value_format.map(str::to_string),
            unit,
            symbol_format,
        };
        self.resolve(key, || {
            QuantityFormat::for_unit(value_format, unit, symbol_format)
                .unwrap_or_else(|err| QuantityFormat::invalid(Some(unit), err))
        })
    }

    /// Number of formats parsed so far, at most one per distinct request
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(&self, key: CacheKey, compute: impl FnOnce() -> QuantityFormat) -> Arc<QuantityFormat> {
        // Clone the cell out so no shard guard is held while computing
        let cell = match self.entries.get(&key) {
            Some(entry) => Arc::clone(entry.value()),
            None => Arc::clone(self.entries.entry(key.clone()).or_default().value()),
        };

        let format = cell.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            let format = compute();
            tracing::trace!(?key, valid = format.is_valid(), "quantity format cached");
            Arc::new(format)
        });
        Arc::clone(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use gauge_core::Culture;
    use QuantityKind::*;

    #[test]
    fn test_same_request_same_format() {
        let registry = UnitRegistry::with_builtin_units();
        let cache = registry.cache();
        let a = cache.get_or_create(&registry, Length, Some("F2 mm"));
        let b = cache.get_or_create(&registry, Length, Some("F2 mm"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.computations(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_distinguish_kind_and_text() {
        let registry = UnitRegistry::with_builtin_units();
        let cache = registry.cache();
        let length = cache.get_or_create(&registry, Length, Some("N"));
        let force = cache.get_or_create(&registry, Force, Some("N"));
        assert_eq!(length.value_format(), Some("N"));
        assert_eq!(force.value_format(), None);
        cache.get_or_create(&registry, Length, Some("N "));
        assert_eq!(cache.computations(), 3);
    }

    #[test]
    fn test_invalid_format_cached() {
        let registry = UnitRegistry::with_builtin_units();
        let cache = registry.cache();
        let first = cache.get_or_create(&registry, Length, Some("F2 kgx"));
        let second = cache.get_or_create(&registry, Length, Some("F2 kgx"));
        assert!(!first.is_valid());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.computations(), 1);
        assert_eq!(first.render(1.0, Culture::invariant()), crate::format::INVALID_FORMAT_TEXT);
    }

    #[test]
    fn test_registries_keep_separate_caches() {
        let metres_only = UnitRegistry::builder()
            .si_unit(Unit::new("m", "metre", Length, 1.0))
            .build();
        let full = UnitRegistry::with_builtin_units();

        assert!(!metres_only.format(Length, Some("F1 mm")).is_valid());
        assert!(full.format(Length, Some("F1 mm")).is_valid());
        assert_eq!(metres_only.cache().computations(), 1);
        assert_eq!(full.cache().computations(), 1);
    }

    #[test]
    fn test_for_unit_keys() {
        let registry = UnitRegistry::with_builtin_units();
        let cache = registry.cache();
        let unit = registry.get(MassFlow, "kg/s").unwrap();
        let signed = cache.get_or_create_for_unit(Some("F1"), unit, SymbolFormat::SignedSuperScript);
        let fraction = cache.get_or_create_for_unit(Some("F1"), unit, SymbolFormat::FractionSuperScript);
        let again = cache.get_or_create_for_unit(Some("F1"), unit, SymbolFormat::SignedSuperScript);
        assert!(Arc::ptr_eq(&signed, &again));
        assert!(!Arc::ptr_eq(&signed, &fraction));
        assert_eq!(signed.symbol(), "kg⋅s⁻¹");
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn test_concurrent_first_access_computes_once() {
        let registry = UnitRegistry::with_builtin_units();
        let formats: Vec<Arc<QuantityFormat>> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| s.spawn(|| registry.format(MassFlow, Some("F3 kg/h"))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.cache().computations(), 1);
        assert!(formats.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(formats[0].render(1.0, Culture::invariant()), "1.000 kg/h");
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let registry = UnitRegistry::with_builtin_units();
        let formats = ["F0 m", "F1 mm", "F2 cm", "F3 km"];
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for format in formats {
                        assert!(registry.format(Length, Some(format)).is_valid());
                    }
                });
            }
        });
        assert_eq!(registry.cache().computations(), formats.len());
        assert_eq!(registry.cache().len(), formats.len());
    }
}
