use clap::Parser;
use clap::ValueEnum;
use env_logger::Builder;
use env_logger::Env;
use grow_hash::CuckooTable;
use grow_hash::ExtendibleBucketTable;
use grow_hash::HybridTable;
use grow_hash::LinearProbeTable;
use grow_hash::Side;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Linear,
    Cuckoo,
    Extendible,
    Hybrid,
}

#[derive(Parser, Debug)]
struct Args {
    /// Table implementation to fill.
    #[arg(short = 't', long = "table", value_enum, default_value_t = Kind::Hybrid)]
    table: Kind,

    /// Number of random keys to insert.
    #[arg(short = 'n', long = "keys", default_value_t = 10_000)]
    keys: usize,

    /// Initial slot count for the linear and cuckoo tables.
    #[arg(short = 'c', long = "capacity", default_value_t = 16)]
    capacity: usize,

    /// Keys per bucket for the extendible and hybrid tables.
    #[arg(short = 'b', long = "bucket_size", default_value_t = 4)]
    bucket_size: usize,

    /// Seed for the key stream.
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,

    /// Dump every slot / bucket after filling.
    #[arg(long = "dump")]
    dump: bool,
}

fn main() {
    // Growth and failure diagnostics show up when the crate is built with the
    // `logging` feature.
    Builder::from_env(Env::default().filter_or("RUST_LOG", "warn")).init();

    let args = Args::parse();
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let keys: Vec<u64> = (0..args.keys).map(|_| rng.random()).collect();

    println!("Filling {:?} table with {} random keys...", args.table, args.keys);

    match args.table {
        Kind::Linear => {
            let mut table = LinearProbeTable::with_capacity(args.capacity);
            let failures = fill(&keys, |key| table.try_insert(key));
            report(table.len(), table.capacity(), failures);
            table.probe_histogram().print();
            table.debug_stats().print();
            if args.dump {
                println!("{table:#?}");
            }
        }
        Kind::Cuckoo => {
            let mut table = CuckooTable::with_capacity(args.capacity);
            let failures = fill(&keys, |key| table.try_insert(key));
            report(table.len(), table.capacity(), failures);
            table.debug_stats().print();
            if args.dump {
                println!("{table:#?}");
            }
        }
        Kind::Extendible => {
            let mut table = ExtendibleBucketTable::with_bucket_size(args.bucket_size);
            let failures = fill(&keys, |key| table.try_insert(key));
            report(table.len(), table.capacity(), failures);
            println!(
                "Global depth: {} ({} buckets)",
                table.global_depth(),
                table.bucket_count()
            );
            table.depth_histogram().print();
            table.debug_stats().print();
            if args.dump {
                println!("{table:#?}");
            }
        }
        Kind::Hybrid => {
            let mut table = HybridTable::with_bucket_size(args.bucket_size);
            let failures = fill(&keys, |key| table.try_insert(key));
            report(table.len(), table.capacity(), failures);
            for side in [Side::First, Side::Second] {
                let inner = table.side(side);
                println!(
                    "{side:?} side: {} keys, global depth {}",
                    inner.len(),
                    inner.global_depth()
                );
                inner.depth_histogram().print();
            }
            table.debug_stats().print();
            if args.dump {
                println!("{table:#?}");
            }
        }
    }
}

/// Inserts every key, returning how many inserts failed.
fn fill<E: std::fmt::Display>(
    keys: &[u64],
    mut insert: impl FnMut(u64) -> Result<bool, E>,
) -> usize {
    let mut failures = 0;
    for &key in keys {
        if let Err(err) = insert(key) {
            if failures == 0 {
                eprintln!("First failed insert ({key}): {err}");
            }
            failures += 1;
        }
    }
    failures
}

fn report(len: usize, capacity: usize, failures: usize) {
    println!("Inserted {len} keys, capacity {capacity}");
    println!(
        "Final load factor: {:.2}%",
        (len as f64 / capacity as f64) * 100.0
    );
    println!("Number of failed inserts: {failures}");
}
