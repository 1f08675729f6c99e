use clap::Parser;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use fixplex::config::FixplexConfig;
use fixplex::fixplex::{Feasibility, Fixplex};
use fixplex::types::Var;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Ring width in bits.
    #[arg(long, value_name = "INT", default_value = "8")]
    bits: u32,

    /// Number of random rows (each with a fresh slack variable).
    #[arg(long, value_name = "INT", default_value = "4")]
    rows: u32,

    /// Number of shared structural variables.
    #[arg(long, value_name = "INT", default_value = "6")]
    vars: u32,

    /// Seed for both the generated tableau and the engine.
    #[arg(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Print the tableau before and after the check.
    #[arg(long)]
    dump: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    // x + y = 0 over 4 bits: x in [5, 16), y in [0, 4) is feasible...
    let mut fp = Fixplex::new(4)?;
    let (x, y) = (Var::new(0), Var::new(1));
    fp.ensure_var(y);
    fp.add_row(x, [(x, 1), (y, 1)])?;
    fp.set_bounds(x, 5, 0)?;
    fp.set_bounds(y, 0, 4)?;
    let result = fp.make_feasible();
    println!("x in [5, 16), y in [0, 4): {:?}, x = {}, y = {}", result, fp.value(x), fp.value(y));

    // ...but with y in [13, 16) it is not.
    fp.set_bounds(y, 13, 0)?;
    let result = fp.make_feasible();
    println!("x in [5, 16), y in [13, 16): {:?}, conflict row = {:?}", result, fp.infeasible_row());

    // A random tableau.
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let config = FixplexConfig::default().with_seed(args.seed);
    let mut fp = Fixplex::with_config(args.bits, config)?;
    let mask = fp.ring().max_value();
    fp.ensure_var(Var::new(args.vars + args.rows - 1));
    for i in 0..args.rows {
        let slack = Var::new(args.vars + i);
        let mut entries = vec![(slack, 1)];
        for j in 0..args.vars {
            if rng.random_bool(0.5) {
                entries.push((Var::new(j), rng.random::<u64>() & mask));
            }
        }
        fp.add_row(slack, entries)?;
    }
    for i in 0..args.vars + args.rows {
        let lo = rng.random::<u64>() & mask;
        let hi = rng.random::<u64>() & mask;
        fp.set_bounds(Var::new(i), lo, hi)?;
    }
    if args.dump {
        println!("{}", fp);
    }

    let time_check = std::time::Instant::now();
    let result = fp.make_feasible();
    let time_check = time_check.elapsed();
    println!("random tableau: {:?} in {:.3} ms", result, time_check.as_secs_f64() * 1000.0);
    if result == Feasibility::Infeasible {
        if let Some(row) = fp.infeasible_row() {
            println!("conflict: {}", fp.row_dump(row)?);
        }
    }
    if args.dump {
        println!("{}", fp);
    }
    println!("{}", fp.stats());

    Ok(())
}
