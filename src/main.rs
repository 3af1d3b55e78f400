fn main() {
    if let Err(err) = tube_timeline::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
