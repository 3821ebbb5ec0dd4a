//! Tests for the memoization engine.

use std::cell::Cell;
use std::rc::Rc;

use super::*;

// =============================================================================
// Shared recurrences
// =============================================================================

fn fib<C>(ctx: &mut Memo<C>, n: usize) -> Result<u64, CacheError>
where
    C: Cache<Key = usize, Value = u64>,
{
    if n <= 1 {
        return Ok(n as u64);
    }
    Ok(ctx.memo(fib, n - 1)? + ctx.memo(fib, n - 2)?)
}

fn collatz(ctx: &mut Memo<HashMapCache<u64, u64>>, n: u64) -> Result<u64, CacheError> {
    if n <= 1 {
        return Ok(0);
    }
    let next = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
    Ok(1 + ctx.memo(collatz, next)?)
}

/// Fibonacci that counts how often each key's body runs
fn counted_fib<C>(
    ctx: &mut Memo<C>,
    counts: &Rc<Vec<Cell<u32>>>,
    n: usize,
) -> Result<u64, CacheError>
where
    C: Cache<Key = usize, Value = u64>,
{
    counts[n].set(counts[n].get() + 1);
    if n <= 1 {
        return Ok(n as u64);
    }
    let a = ctx.memo(|ctx, k| counted_fib(ctx, counts, k), n - 1)?;
    let b = ctx.memo(|ctx, k| counted_fib(ctx, counts, k), n - 2)?;
    Ok(a + b)
}

fn female_ref(n: i64) -> i64 {
    if n == 0 { 1 } else { n - male_ref(female_ref(n - 1)) }
}

fn male_ref(n: i64) -> i64 {
    if n == 0 { 0 } else { n - female_ref(male_ref(n - 1)) }
}

type Hofstadter = (FixedCache<i64>, FixedCache<i64>);

fn female(ctx: &mut Memo<Hofstadter>, n: usize) -> Result<i64, CacheError> {
    if n == 0 {
        return Ok(1);
    }
    let f = ctx.memo_at::<0, _>(female, n - 1)?;
    Ok(n as i64 - ctx.memo_at::<1, _>(male, f as usize)?)
}

fn male(ctx: &mut Memo<Hofstadter>, n: usize) -> Result<i64, CacheError> {
    if n == 0 {
        return Ok(0);
    }
    let m = ctx.memo_at::<1, _>(male, n - 1)?;
    Ok(n as i64 - ctx.memo_at::<0, _>(female, m as usize)?)
}

// =============================================================================
// Memoize combinator
// =============================================================================

#[test]
fn test_fibonacci_linear_dependency_chain() {
    let results = eval_hash_map(|ctx| {
        (0..=20)
            .map(|n| ctx.memo(fib, n))
            .collect::<Result<Vec<_>, CacheError>>()
    })
    .unwrap();

    assert_eq!(results[0], 0);
    assert_eq!(results[1], 1);
    assert_eq!(results[2], 1);
    assert_eq!(results[5], 5);
    assert_eq!(results[10], 55);
    assert_eq!(results[20], 6765);
}

#[test]
fn test_compute_once_on_repeated_memo() {
    let runs = Cell::new(0);
    let (first, second) = eval_hash_map(|ctx| {
        let square = |_: &mut Memo<HashMapCache<u32, u32>>, n: u32| -> Result<u32, CacheError> {
            runs.set(runs.get() + 1);
            Ok(n * n)
        };
        let first = ctx.memo(square, 7)?;
        let second = ctx.memo(square, 7)?;
        Ok::<_, CacheError>((first, second))
    })
    .unwrap();

    assert_eq!(first, 49);
    assert_eq!(first, second);
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_fixed_fibonacci_evaluates_each_key_once() {
    let counts = Rc::new((0..=10).map(|_| Cell::new(0)).collect::<Vec<_>>());

    let value =
        eval_fixed(11, |ctx| ctx.memo(|ctx, k| counted_fib(ctx, &counts, k), 10)).unwrap();

    assert_eq!(value, 55);
    for (n, count) in counts.iter().enumerate() {
        assert_eq!(count.get(), 1, "fib({}) evaluated {} times", n, count.get());
    }
}

#[test]
fn test_diamond_dependency_memoization() {
    // A(0) depends on B(1) and C(2), both depend on D(3)
    let compute_count = Cell::new(0);

    fn diamond(
        ctx: &mut Memo<ExpandableCache<i32>>,
        count: &Cell<i32>,
        n: usize,
    ) -> Result<i32, CacheError> {
        count.set(count.get() + 1);
        let mut dep = |k| ctx.memo(|ctx, k| diamond(ctx, count, k), k);
        Ok(match n {
            0 => dep(1)? + dep(2)?,
            1 => dep(3)? * 2,
            2 => dep(3)? * 3,
            _ => 10,
        })
    }

    let (result, stats) = eval_expandable(None, |ctx| {
        let value = ctx.memo(|ctx, k| diamond(ctx, &compute_count, k), 0)?;
        // Asking again must not recompute
        ctx.memo(|ctx, k| diamond(ctx, &compute_count, k), 0)?;
        Ok::<_, CacheError>((value, ctx.stats()))
    })
    .unwrap();

    // D=10, B=20, C=30, A=50
    assert_eq!(result, 50);
    assert_eq!(compute_count.get(), 4);
    assert_eq!(stats, MemoStats { hits: 2, misses: 4 });
}

#[test]
fn test_collatz_known_values() {
    let lengths = eval_hash_map(|ctx| {
        [1u64, 2, 3, 6, 7, 27]
            .into_iter()
            .map(|n| ctx.memo(collatz, n))
            .collect::<Result<Vec<_>, CacheError>>()
    })
    .unwrap();

    assert_eq!(lengths, vec![0, 1, 7, 8, 16, 111]);
}

#[test]
fn test_hashmap_string_keys() {
    fn length(ctx: &mut Memo<HashMapCache<String, usize>>, s: String) -> Result<usize, CacheError> {
        if s.is_empty() {
            return Ok(0);
        }
        let shorter = s[..s.len() - 1].to_string();
        Ok(ctx.memo(length, shorter)? + 1)
    }

    let (len, cache) = run_hash_map(|ctx| ctx.memo(length, "abcd".to_string())).unwrap();
    assert_eq!(len, 4);
    assert_eq!(cache.len(), 5);
    assert_eq!(cache.lookup(&"ab".to_string()).unwrap(), Some(2));
    assert_eq!(cache.into_inner().get(""), Some(&0));
}

#[test]
fn test_same_function_over_every_backend() {
    let expected = 832_040;
    assert_eq!(eval_hash_map(|ctx| ctx.memo(fib, 30)).unwrap(), expected);
    assert_eq!(eval_dense(0usize, 30, |ctx| ctx.memo(fib, 30)).unwrap(), expected);
    assert_eq!(eval_fixed(31, |ctx| ctx.memo(fib, 30)).unwrap(), expected);
    assert_eq!(eval_expandable(Some(1), |ctx| ctx.memo(fib, 30)).unwrap(), expected);

    let packed_fixed = PackedFixedCache::packed(31);
    assert_eq!(Memo::eval(packed_fixed, |ctx| ctx.memo(fib, 30)).unwrap(), expected);
    let packed_dense = PackedDenseCache::packed(0usize, 30).unwrap();
    assert_eq!(Memo::eval(packed_dense, |ctx| ctx.memo(fib, 30)).unwrap(), expected);
    let packed_expandable = PackedExpandableCache::packed();
    assert_eq!(Memo::eval(packed_expandable, |ctx| ctx.memo(fib, 30)).unwrap(), expected);
}

#[test]
fn test_run_retains_final_storage() {
    let (value, cache) = run_fixed(8, |ctx| ctx.memo(fib, 6)).unwrap();
    assert_eq!(value, 8);
    assert_eq!(
        cache.into_values(),
        vec![Some(0), Some(1), Some(1), Some(2), Some(3), Some(5), Some(8), None]
    );

    let (_, cache) = run_dense(0usize, 9usize, |ctx| ctx.memo(fib, 6)).unwrap();
    assert_eq!(
        cache.iter().collect::<Vec<_>>(),
        vec![(0, 0), (1, 1), (2, 1), (3, 2), (4, 3), (5, 5), (6, 8)]
    );

    let (_, cache) = run_expandable(Some(2), |ctx| ctx.memo(fib, 6)).unwrap();
    assert_eq!(cache.capacity(), 8);
    assert_eq!(cache.len(), 7);
}

#[test]
fn test_out_of_range_propagates_to_entry_point() {
    let result = eval_fixed(5, |ctx| ctx.memo(fib, 10));
    assert!(matches!(result, Err(CacheError::IndexOutOfRange { .. })));

    let result = eval_dense(2usize, 10usize, |ctx| ctx.memo(fib, 10));
    match result {
        Err(CacheError::IndexOutOfRange { key, bounds }) => {
            assert_eq!(key, "1");
            assert_eq!(bounds, "2..=10");
        }
        other => panic!("Expected IndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_body_errors_propagate_and_store_nothing() {
    fn checked(ctx: &mut Memo<FixedCache<u32>>, n: usize) -> anyhow::Result<u32> {
        if n == 0 {
            return Ok(0);
        }
        let previous = ctx.memo(checked, n - 1)?;
        if n == 3 {
            anyhow::bail!("refusing {}", n);
        }
        Ok(previous + 1)
    }

    let mut memo = Memo::new(FixedCache::new(8));
    let err = memo.memo(checked, 6).unwrap_err();
    assert_eq!(err.to_string(), "refusing 3");

    // Keys below the failure were stored, the failed chain was not
    let cache = memo.into_caches();
    assert_eq!(cache.lookup(&2).unwrap(), Some(2));
    assert_eq!(cache.lookup(&3).unwrap(), None);
    assert_eq!(cache.lookup(&6).unwrap(), None);
}

#[test]
fn test_independent_contexts_do_not_share_entries() {
    let runs = Cell::new(0);
    let body = |ctx: &mut Memo<HashMapCache<u8, u8>>| {
        ctx.memo(
            |_, k| {
                runs.set(runs.get() + 1);
                Ok::<_, CacheError>(k)
            },
            1,
        )
    };

    Memo::eval(HashMapCache::new(), &body).unwrap();
    Memo::eval(HashMapCache::new(), &body).unwrap();
    assert_eq!(runs.get(), 2);
}

// =============================================================================
// Backends
// =============================================================================

#[test]
fn test_hashmap_store_overwrites() {
    let mut cache: HashMapCache<&str, i32> = HashMapCache::with_capacity(4);
    assert_eq!(cache.lookup(&"key1").unwrap(), None);
    cache.store("key1", 42).unwrap();
    cache.store("key1", 43).unwrap();
    assert_eq!(cache.lookup(&"key1").unwrap(), Some(43));
    assert!(cache.contains(&"key1").unwrap());
    assert!(!cache.contains(&"key2").unwrap());
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_dense_bounds_enforcement() {
    let mut cache: DenseCache<i32, char> = DenseCache::new(0, 5).unwrap();

    assert!(matches!(cache.store(6, 'x'), Err(CacheError::IndexOutOfRange { .. })));
    assert!(matches!(cache.lookup(&6), Err(CacheError::IndexOutOfRange { .. })));
    assert!(matches!(cache.lookup(&-1), Err(CacheError::IndexOutOfRange { .. })));

    cache.store(5, 'x').unwrap();
    assert_eq!(cache.lookup(&5).unwrap(), Some('x'));
    assert_eq!(cache.bounds(), (0, 5));
    assert_eq!(cache.capacity(), 6);
}

#[test]
fn test_dense_empty_and_oversized_ranges() {
    let cache: DenseCache<i32, u8> = DenseCache::new(3, 2).unwrap();
    assert_eq!(cache.capacity(), 0);
    assert!(cache.lookup(&3).is_err());

    let result: Result<DenseCache<(u64, u64), u8>, _> =
        DenseCache::new((0, 0), (u64::MAX, u64::MAX));
    assert!(matches!(result, Err(CacheError::RangeTooLarge { .. })));
}

#[test]
fn test_fixed_bounds_enforcement() {
    let mut cache: FixedCache<u8> = FixedCache::new(3);
    cache.store(2, 9).unwrap();
    assert_eq!(cache.lookup(&2).unwrap(), Some(9));
    assert!(matches!(cache.store(3, 1), Err(CacheError::IndexOutOfRange { .. })));
    assert_eq!(
        cache.lookup(&3).unwrap_err().to_string(),
        "Key 3 is out of range 0..3"
    );
}

#[test]
fn test_expandable_growth_preserves_data() {
    let mut cache: ExpandableCache<usize> = ExpandableCache::with_capacity(4);
    let mut capacities = vec![cache.capacity()];
    for key in 0..10 {
        cache.store(key, key * 10 + 1).unwrap();
        if capacities.last() != Some(&cache.capacity()) {
            capacities.push(cache.capacity());
        }
    }

    assert_eq!(capacities, vec![4, 8, 16]);
    let read: Vec<_> = (0..10).map(|key| cache.lookup(&key).unwrap()).collect();
    let expected: Vec<_> = (0..10).map(|key| Some(key * 10 + 1)).collect();
    assert_eq!(read, expected);
    assert_eq!(cache.lookup(&15).unwrap(), None);
}

#[test]
fn test_expandable_lookup_never_grows() {
    let cache: ExpandableCache<u8> = ExpandableCache::new();
    assert_eq!(cache.capacity(), 16);
    assert_eq!(cache.lookup(&1_000_000).unwrap(), None);
    assert!(!cache.contains(&1_000_000).unwrap());
    assert_eq!(cache.capacity(), 16);
}

#[test]
fn test_expandable_from_zero_capacity() {
    let mut cache: ExpandableCache<u8> = ExpandableCache::with_capacity(0);
    cache.store(0, 1).unwrap();
    assert_eq!(cache.capacity(), 1);
    cache.store(5, 2).unwrap();
    assert_eq!(cache.capacity(), 8);
    assert_eq!(cache.iter().collect::<Vec<_>>(), vec![(0, 1), (5, 2)]);
}

#[test]
fn test_packed_backends_store_raw_values() {
    let mut cache = PackedFixedCache::<i64>::packed(4);
    cache.store(1, -7).unwrap();
    cache.store(2, 0).unwrap();
    assert_eq!(cache.lookup(&0).unwrap(), None);
    assert_eq!(cache.lookup(&1).unwrap(), Some(-7));
    assert_eq!(cache.lookup(&2).unwrap(), Some(0));

    let raw: Vec<i64> = cache.into_slots().into_iter().map(Packed::into_raw).collect();
    assert_eq!(raw, vec![i64::MIN, -7, 0, i64::MIN]);
}

#[test]
fn test_packed_sentinel_collision_recomputes() {
    // A body returning the sentinel is never recorded, so it runs every time
    let runs = Cell::new(0);
    let mut memo = Memo::new(PackedExpandableCache::<u32>::packed_with_capacity(2));
    for _ in 0..3 {
        let value = memo
            .memo(
                |_, _| {
                    runs.set(runs.get() + 1);
                    Ok::<_, CacheError>(u32::MAX)
                },
                1,
            )
            .unwrap();
        assert_eq!(value, u32::MAX);
    }
    assert_eq!(runs.get(), 3);

    // The same body over Option slots runs once
    runs.set(0);
    let mut memo = Memo::new(ExpandableCache::<u32>::with_capacity(2));
    for _ in 0..3 {
        memo.memo(
            |_, _| {
                runs.set(runs.get() + 1);
                Ok::<_, CacheError>(u32::MAX)
            },
            1,
        )
        .unwrap();
    }
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_dyn_cache_matches_backend_behavior() {
    let mut fixed: DynCache<u8> = BackendConfig::Fixed { capacity: 2 }.build().unwrap();
    assert_eq!(fixed.backend_name(), "fixed");
    assert!(fixed.store(2, 0).is_err());

    let mut dense: DynCache<u8> = BackendConfig::Dense { lo: 5, hi: 6 }.build().unwrap();
    dense.store(6, 1).unwrap();
    assert!(dense.lookup(&4).is_err());
    assert_eq!(dense.len(), 1);

    let mut expandable: DynCache<u8, Packed<u8>> = BackendConfig::Expandable {
        initial_capacity: None,
    }
    .build()
    .unwrap();
    expandable.store(100, 3).unwrap();
    assert!(expandable.contains(&100).unwrap());

    let hash: DynCache<u8> = BackendConfig::default().build().unwrap();
    assert_eq!(hash.backend_name(), "hash_map");
    assert!(hash.is_empty());
}

#[test]
fn test_backend_config_display() {
    assert_eq!(BackendConfig::HashMap.to_string(), "hash_map");
    assert_eq!(BackendConfig::Dense { lo: 1, hi: 9 }.to_string(), "dense(1..=9)");
    assert_eq!(
        BackendConfig::Expandable { initial_capacity: Some(4) }.to_string(),
        "expandable(capacity = 4)"
    );
    assert_eq!(
        BackendConfig::Expandable { initial_capacity: None }.to_string(),
        "expandable"
    );
}

// =============================================================================
// Layers
// =============================================================================

#[test]
fn test_layer_isolation() {
    let layers = (ExpandableCache::<&str>::new(), FixedCache::<&str>::new(8));
    let mut memo = Memo::new(layers);

    let a = memo.memo_at::<0, _>(|_, _| Ok::<_, CacheError>("layer zero"), 3).unwrap();
    let b = memo.memo_at::<1, _>(|_, _| Ok::<_, CacheError>("layer one"), 3).unwrap();

    assert_eq!(a, "layer zero");
    assert_eq!(b, "layer one");
    assert_eq!(memo.layer::<0>().lookup(&3).unwrap(), Some("layer zero"));
    assert_eq!(memo.layer::<1>().lookup(&3).unwrap(), Some("layer one"));
    assert_eq!(memo.stats().misses, 2);
}

#[test]
fn test_mutual_recursion_matches_reference() {
    let layers = (FixedCache::new(11), FixedCache::new(11));
    let (females, males) = Memo::eval(layers, |ctx| {
        let mut females = Vec::new();
        let mut males = Vec::new();
        for n in 0..=10 {
            females.push(ctx.memo_at::<0, _>(female, n)?);
            males.push(ctx.memo_at::<1, _>(male, n)?);
        }
        Ok::<_, CacheError>((females, males))
    })
    .unwrap();

    let expected_females: Vec<_> = (0..=10).map(female_ref).collect();
    let expected_males: Vec<_> = (0..=10).map(male_ref).collect();
    assert_eq!(females, expected_females);
    assert_eq!(males, expected_males);
    assert_eq!(males, vec![0, 0, 1, 2, 2, 3, 4, 4, 5, 6, 6]);
}

#[test]
fn test_array_layers_from_configs() {
    fn even(ctx: &mut Memo<[DynCache<bool>; 2]>, n: usize) -> Result<bool, CacheError> {
        if n == 0 {
            return Ok(true);
        }
        ctx.memo_at::<1, _>(odd, n - 1)
    }

    fn odd(ctx: &mut Memo<[DynCache<bool>; 2]>, n: usize) -> Result<bool, CacheError> {
        if n == 0 {
            return Ok(false);
        }
        ctx.memo_at::<0, _>(even, n - 1)
    }

    let configs = [
        BackendConfig::Expandable { initial_capacity: Some(1) },
        BackendConfig::HashMap,
    ];
    let layers = [configs[0].build().unwrap(), configs[1].build().unwrap()];
    let (is_even, layers) = Memo::run(layers, |ctx| ctx.memo_at::<0, _>(even, 41)).unwrap();

    assert!(!is_even);
    // Layer 0 holds even(41), even(39), ...; layer 1 holds odd(40), odd(38), ...
    assert_eq!(layers[0].lookup(&41).unwrap(), Some(false));
    assert_eq!(layers[0].lookup(&40).unwrap(), None);
    assert_eq!(layers[1].lookup(&40).unwrap(), Some(false));
    assert_eq!(layers[1].lookup(&41).unwrap(), None);
}

#[test]
fn test_three_layers_with_mixed_keys() {
    type Stack = (
        HashMapCache<String, usize>,
        DenseCache<(u8, u8), u32>,
        FixedCache<u64>,
    );

    let mut memo = Memo::new((
        HashMapCache::new(),
        DenseCache::new((0, 0), (3, 3)).unwrap(),
        FixedCache::new(4),
    ));
    let grid = |_: &mut Memo<Stack>, (r, c): (u8, u8)| Ok::<_, CacheError>(u32::from(r * 4 + c));

    let length = |_: &mut Memo<Stack>, s: String| Ok::<_, CacheError>(s.len());
    let double = |_: &mut Memo<Stack>, n: usize| Ok::<_, CacheError>(n as u64 * 2);

    assert_eq!(memo.memo_at::<0, _>(length, "abc".into()).unwrap(), 3);
    assert_eq!(memo.memo_at::<1, _>(grid, (2, 1)).unwrap(), 9);
    assert_eq!(memo.memo_at::<2, _>(double, 3).unwrap(), 6);
    assert!(memo.memo_at::<1, _>(grid, (4, 0)).is_err());
    // The rejected key fails at lookup, before it counts as a miss
    assert_eq!(memo.stats(), MemoStats { hits: 0, misses: 3 });
}
