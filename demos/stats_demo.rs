use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use chain_hash::HashTable;
use chain_hash::hash_table::Entry;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Number of values to insert. Defaults to the initial capacity.
    #[arg(short = 'n', long = "values")]
    values: Option<usize>,

    /// Remove every n-th value through a cursor after filling.
    #[arg(short = 'r', long = "remove_every")]
    remove_every: Option<u64>,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() -> Result<(), chain_hash::TableError> {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity)?;
    let initial_capacity = table.capacity();

    println!("Actual capacity: {}", initial_capacity);
    println!("Filling table with u64 values...");

    let num_values = args.values.unwrap_or(initial_capacity);
    for i in 0..num_values {
        let value = i as u64;
        let hash = hash_u64(value);

        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    println!("Inserted {} values into table", table.len());
    println!(
        "Capacity grew from {} to {} buckets",
        initial_capacity,
        table.capacity()
    );

    if let Some(every) = args.remove_every.filter(|&n| n > 0) {
        let mut cursor = table.cursor();
        let mut removed = 0;
        while cursor.has_next(&table)? {
            if cursor.next(&table)? % every == 0 {
                cursor.remove_current(&mut table)?;
                removed += 1;
            }
        }
        println!("Removed {} values through a cursor", removed);
    }

    table.stats().print();
    println!("Generation: {}", table.generation());

    Ok(())
}
