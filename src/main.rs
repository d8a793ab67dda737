fn main() {
    grakmat::cli::run();
}
