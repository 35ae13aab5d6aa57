fn main() {
    yangcheck::cli::run();
}
