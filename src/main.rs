fn main() -> anyhow::Result<()> {
    workout_timer_lib::run()
}
