fn main() {
    lalrpop::process_root().expect("failed to generate the expression parser");

    println!("cargo:rerun-if-changed=src/grammar.lalrpop");
}
