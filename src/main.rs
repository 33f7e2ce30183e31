use std::process;

use cfg_yacc::{Options, YaccOracle};
use clap::Parser;
use log::debug;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = Options::parse();
    let mut oracle = YaccOracle::new(options.yacc.clone());
    if let Err(err) = cfg_yacc::run(&options, &mut oracle) {
        debug!("{:?}", err);
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
