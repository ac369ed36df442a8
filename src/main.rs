/*!
 * Heap Simulator - Demo Entry Point
 *
 * Replays the allocator scenarios:
 * - Best-fit hole selection and pooling reuse
 * - The same workload under both strategies
 * - Fragmentation, exhaustion, invalid free and double free
 *
 * The heap under `HEAP_STRATEGY` / `HEAP_TOTAL_SIZE` is exercised last.
 */

use anyhow::{Context, Result};
use heap_sim::{init_tracing, Address, Heap, HeapConfig, HeapError, Size, StrategyConfig};
use tracing::{error, info};

fn main() -> Result<()> {
    init_tracing();

    best_fit_walkthrough()?;
    pooling_walkthrough()?;
    for strategy in [StrategyConfig::BestFit, StrategyConfig::pooling_default()] {
        allocation_pattern(strategy)?;
    }
    failure_scenarios()?;

    let config = HeapConfig::from_env().context("Failed to load heap configuration")?;
    configured_heap(&config)?;

    info!("All scenarios completed");
    Ok(())
}

fn banner(title: &str) {
    info!("{}", "=".repeat(60));
    info!("{}", title);
    info!("{}", "=".repeat(60));
}

fn dump(heap: &Heap) -> Result<()> {
    let snapshot = serde_json::to_string(&heap.dump()).context("Failed to serialize snapshot")?;
    println!("{snapshot}");
    Ok(())
}

fn best_fit_walkthrough() -> Result<()> {
    banner("BEST FIT ALLOCATION STRATEGY");
    let mut heap = Heap::best_fit(100)?;

    let p1 = heap.allocate(20)?;
    let _p2 = heap.allocate(30)?;
    let p3 = heap.allocate(15)?;
    dump(&heap)?;

    heap.deallocate(p1)?;
    heap.deallocate(p3)?;
    dump(&heap)?;

    let p4 = heap.allocate(18)?;
    info!(address = p4, "Best fit chose the smallest suitable hole");
    dump(&heap)
}

fn pooling_walkthrough() -> Result<()> {
    banner("POOLING ALLOCATION STRATEGY");
    let mut heap = Heap::pooling(128)?;

    heap.allocate(20)?;
    let b = heap.allocate(50)?;
    heap.allocate(60).map(|_| ()).or_else(expected_failure)?;
    dump(&heap)?;

    heap.deallocate(b)?;
    dump(&heap)?;

    let d = heap.allocate(40)?;
    info!(address = d, reused = d == b, "Pooling reused freed chunk");
    dump(&heap)
}

fn allocation_pattern(strategy: StrategyConfig) -> Result<()> {
    banner(&format!("COMPARISON: {}", strategy.name().to_uppercase()));
    let mut heap = Heap::new(200, strategy)?;

    let _a = heap.allocate(30)?;
    let b = heap.allocate(40)?;
    let _c = heap.allocate(30)?;
    let d = heap.allocate(40)?;

    heap.deallocate(b)?;
    heap.deallocate(d)?;
    dump(&heap)?;

    match heap.allocate(35) {
        Ok(address) => info!(address, "Allocated 35 bytes"),
        Err(e) => error!(error = %e, "Allocation of 35 bytes failed"),
    }
    dump(&heap)
}

fn failure_scenarios() -> Result<()> {
    banner("SCENARIO: FRAGMENTATION (BEST FIT)");
    let mut heap = Heap::best_fit(80)?;
    let addrs = allocate_all(&mut heap, &[20, 20, 20, 20])?;
    heap.deallocate(addrs[1])?;
    heap.deallocate(addrs[3])?;
    report(heap.allocate(25));

    banner("SCENARIO: OUT OF MEMORY (BEST FIT)");
    let mut heap = Heap::best_fit(50)?;
    allocate_all(&mut heap, &[30, 15])?;
    report(heap.allocate(10));

    banner("SCENARIO: INVALID FREE");
    let mut heap = Heap::best_fit(100)?;
    heap.allocate(20)?;
    report(heap.deallocate(999));

    banner("SCENARIO: DOUBLE FREE");
    let mut heap = Heap::best_fit(100)?;
    let p = heap.allocate(20)?;
    heap.deallocate(p)?;
    report(heap.deallocate(p));

    banner("SCENARIO: POOLING OUT OF MEMORY");
    let mut heap = Heap::pooling(128)?;
    loop {
        match heap.allocate(60) {
            Ok(address) => info!(address, "Allocated 64-byte chunk"),
            Err(e) => {
                report::<()>(Err(e));
                break;
            }
        }
    }
    dump(&heap)?;

    banner("SCENARIO: POOLING REQUEST TOO LARGE");
    let mut heap = Heap::pooling(256)?;
    report(heap.allocate(1024));
    Ok(())
}

fn configured_heap(config: &HeapConfig) -> Result<()> {
    banner(&format!(
        "CONFIGURED HEAP: {} bytes, {}",
        config.total_size,
        config.strategy.name()
    ));
    let mut heap = Heap::from_config(config)?;

    let mut live = Vec::new();
    let mut size: Size = 8;
    while let Ok(address) = heap.allocate(size) {
        live.push(address);
        size = size * 2 % 700 + 8;
    }
    for address in live.iter().step_by(2) {
        heap.deallocate(*address)?;
    }

    let stats = heap.stats();
    info!(
        used = stats.used_bytes,
        free = stats.free_bytes,
        largest_free = stats.largest_free,
        fragmentation = stats.fragmentation,
        pressure = %stats.memory_pressure(),
        "Configured heap after churn"
    );
    Ok(())
}

fn allocate_all(heap: &mut Heap, sizes: &[Size]) -> Result<Vec<Address>> {
    sizes
        .iter()
        .map(|&size| {
            heap.allocate(size)
                .with_context(|| format!("Setup allocation of {size} bytes failed"))
        })
        .collect()
}

fn expected_failure(e: HeapError) -> Result<()> {
    info!(error = %e, "Expected failure");
    Ok(())
}

fn report<T: std::fmt::Debug>(result: Result<T, HeapError>) {
    match result {
        Ok(value) => error!(?value, "Scenario unexpectedly succeeded"),
        Err(e) => info!(error = %e, "Expected error caught"),
    }
}
