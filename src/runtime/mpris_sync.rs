use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let track = app
        .snapshot
        .track_id
        .and_then(|id| app.tracks.iter().find(|t| t.id == id));
    mpris.update(&app.snapshot, track);
}
