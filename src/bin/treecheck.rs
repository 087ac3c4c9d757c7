fn main() {
    treecheck::cli::run();
}
