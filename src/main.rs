use anyhow::Context;
use tsuki::logging::FileLogger;
use tsuki::App;

fn main() -> anyhow::Result<()> {
    // TUI 動作中に stderr へ書くと画面が崩れるためファイルのみに出す
    let mut logger = FileLogger::new(log::LevelFilter::Info).without_stderr();
    if let Some(dir) = dirs::state_dir().or_else(dirs::data_local_dir) {
        logger = logger.with_file_output(dir.join("tsuki").join("tsuki.log"));
    }
    let _ = logger.install();

    let mut app = App::new().context("起動時の初期化に失敗しました")?;
    app.run().context("エディタの実行中にエラーが発生しました")?;

    Ok(())
}
