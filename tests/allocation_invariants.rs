//! Allocation invariant tests
//!
//! Exercises the observable guarantees of each strategy through the public
//! simulation API: placement, ownership, deletion accounting and rollback.

use blocksim::validation::parse_block_count;
use blocksim::{AllocationStrategy, BlockRole, SimError, Simulation, SimulationBuilder};
use std::collections::HashSet;

fn sim(size: usize, strategy: AllocationStrategy) -> Simulation {
    SimulationBuilder::new()
        .disk_size(size)
        .strategy(strategy)
        .seed(2024)
        .build()
        .unwrap()
}

#[test]
fn test_initialize_all_free() {
    for size in [1, 2, 20, 100, 256] {
        for strategy in AllocationStrategy::ALL {
            let sim = sim(size, strategy);
            assert_eq!(sim.store().count_free(), size);
            assert_eq!(sim.store().len(), size);
            assert!(sim.table().is_empty());
        }
    }
}

#[test]
fn test_initialize_rejects_bad_sizes() {
    let mut sim = sim(10, AllocationStrategy::Contiguous);
    sim.allocate("keep", 2).unwrap();

    for size in [0, 257, 1000] {
        assert!(matches!(
            sim.initialize(size, AllocationStrategy::Chained),
            Err(SimError::InvalidSize { .. })
        ));
    }

    // Failed re-initialization leaves the session alone
    assert!(sim.lookup("keep").is_ok());
    assert_eq!(sim.strategy(), AllocationStrategy::Contiguous);
}

#[test]
fn test_contiguous_on_empty_disk() {
    for (n, k) in [(1, 1), (10, 1), (10, 4), (10, 10), (256, 100)] {
        let mut sim = sim(n, AllocationStrategy::Contiguous);
        let entry = sim.allocate("f", k).unwrap();
        assert_eq!(entry.data_blocks, (0..k).collect::<Vec<_>>());
        assert_eq!(entry.index_block, None);
    }
}

#[test]
fn test_contiguous_fails_without_run() {
    // size 5, free at {0, 2, 4}
    let mut sim = sim(5, AllocationStrategy::Contiguous);
    sim.allocate("a", 1).unwrap(); // 0
    sim.allocate("b", 1).unwrap(); // 1
    sim.allocate("c", 1).unwrap(); // 2
    sim.allocate("d", 1).unwrap(); // 3
    sim.delete_file("a").unwrap();
    sim.delete_file("c").unwrap();
    assert_eq!(sim.store().free_indices(), vec![0, 2, 4]);

    let before = sim.snapshot();
    let result = sim.allocate("e", 2);

    assert!(matches!(
        result,
        Err(SimError::InsufficientSpace { requested: 2, free: 3 })
    ));
    assert_eq!(sim.snapshot(), before);
}

#[test]
fn test_random_strategies_overflow_rolls_back() {
    for strategy in [AllocationStrategy::Chained, AllocationStrategy::Indexed] {
        let mut sim = sim(12, strategy);
        sim.allocate("a", 3).unwrap();

        let free_before = sim.store().count_free();
        let table_before = sim.table().clone();
        let store_before = sim.store().clone();

        let result = sim.allocate("huge", free_before + 1);

        assert!(matches!(result, Err(SimError::InsufficientSpace { .. })));
        assert_eq!(sim.store().count_free(), free_before);
        assert_eq!(sim.store(), &store_before);
        assert_eq!(sim.table(), &table_before);
        assert!(sim.lookup("huge").is_err());
    }
}

#[test]
fn test_indexed_needs_room_for_index_block() {
    let mut sim = sim(6, AllocationStrategy::Indexed);

    // 6 data blocks + 1 index block do not fit on 6 blocks
    assert!(sim.allocate("a", 6).is_err());
    assert_eq!(sim.store().count_free(), 6);

    let entry = sim.allocate("a", 5).unwrap();
    assert_eq!(entry.block_count(), 6);
    assert_eq!(sim.store().count_free(), 0);
}

#[test]
fn test_files_are_disjoint_and_owned() {
    for strategy in AllocationStrategy::ALL {
        let mut sim = sim(120, strategy);

        for i in 0..15 {
            let entry = sim.allocate(&format!("file{}", i), 1 + i % 5).unwrap();
            for &block in &entry.all_blocks() {
                assert_eq!(
                    sim.store().get(block).unwrap().owner(),
                    Some(entry.name.as_str())
                );
            }
        }

        let mut seen = HashSet::new();
        for entry in sim.table().all() {
            for block in entry.all_blocks() {
                assert!(seen.insert(block), "Block {} used by multiple files!", block);
            }
        }

        sim.verify().unwrap();
    }
}

#[test]
fn test_index_block_role() {
    let mut sim = sim(30, AllocationStrategy::Indexed);
    let entry = sim.allocate("idx", 6).unwrap();

    let index = entry.index_block.unwrap();
    assert_eq!(sim.store().get(index).unwrap().role(), Some(BlockRole::Index));
    for &block in &entry.data_blocks {
        assert_eq!(sim.store().get(block).unwrap().role(), Some(BlockRole::Plain));
    }
}

#[test]
fn test_delete_restores_exactly_owned_blocks() {
    for strategy in AllocationStrategy::ALL {
        let mut sim = sim(40, strategy);
        sim.allocate("keep", 4).unwrap();
        let target = sim.allocate("drop", 5).unwrap();
        sim.allocate("also", 3).unwrap();

        let free_before = sim.store().count_free();
        let mut free_expected: Vec<usize> = sim.store().free_indices();
        free_expected.extend(target.all_blocks());
        free_expected.sort_unstable();

        let removed = sim.delete_file("drop").unwrap();

        assert_eq!(removed, target);
        assert_eq!(
            sim.store().count_free(),
            free_before + target.data_blocks.len() + usize::from(target.index_block.is_some())
        );
        assert_eq!(sim.store().free_indices(), free_expected);
        assert_eq!(sim.store().owned_by("drop"), Vec::<usize>::new());
        sim.verify().unwrap();
    }
}

#[test]
fn test_delete_unknown_is_not_found() {
    let mut sim = sim(10, AllocationStrategy::Chained);
    sim.allocate("a", 3).unwrap();
    let before = sim.snapshot();

    assert!(matches!(sim.delete_file("b"), Err(SimError::NotFound(_))));
    assert_eq!(sim.snapshot(), before);
}

#[test]
fn test_contiguous_round_trip_reuses_positions() {
    let mut sim = sim(16, AllocationStrategy::Contiguous);

    let f = sim.allocate("F", 5).unwrap();
    sim.delete_file("F").unwrap();
    let g = sim.allocate("G", 5).unwrap();

    assert_eq!(g.data_blocks, f.data_blocks);
}

#[test]
fn test_fragmentation_blocks_contiguous_but_not_chained() {
    let mut sim = sim(10, AllocationStrategy::Contiguous);
    for i in 0..10 {
        sim.allocate(&format!("f{}", i), 1).unwrap();
    }
    for i in (0..10).step_by(2) {
        sim.delete_file(&format!("f{}", i)).unwrap();
    }

    // Five free blocks, none adjacent
    assert_eq!(sim.store().count_free(), 5);
    assert_eq!(sim.stats().largest_free_run, 1);
    assert!(sim.allocate("wide", 2).is_err());

    sim.set_strategy(AllocationStrategy::Chained);
    let entry = sim.allocate("wide", 5).unwrap();
    let mut blocks = entry.data_blocks.clone();
    blocks.sort_unstable();
    assert_eq!(blocks, vec![0, 2, 4, 6, 8]);
    assert_eq!(sim.store().count_free(), 0);
}

#[test]
fn test_huge_block_count_rejected_by_every_strategy() {
    let count = parse_block_count(&usize::MAX.to_string()).unwrap();
    assert_eq!(count, usize::MAX);

    for strategy in AllocationStrategy::ALL {
        let mut sim = sim(8, strategy);
        sim.allocate("small", 2).unwrap();
        let free_before = sim.store().count_free();
        let before = sim.snapshot();

        let result = sim.allocate("x", count);

        assert!(
            matches!(result, Err(SimError::InsufficientSpace { free, .. }) if free == free_before),
            "{}: expected InsufficientSpace, got {:?}",
            strategy,
            result
        );
        assert_eq!(sim.snapshot(), before);
    }
}
