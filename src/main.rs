fn main() {
    std::process::exit(edusense_planner_lib::run());
}
