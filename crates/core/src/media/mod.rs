use crate::{
    markup::{self, ElementAttributes, ElementId},
    render::PresentationIntent,
    GalleryError, Result,
};

/// Host media playback.
pub trait MediaPlayer {
    /// Starts playback; hosts that block autoplay return
    /// [`GalleryError::PlaybackRejected`].
    fn play(&mut self, element: &ElementId, src: &str) -> Result<()>;
}

/// Player that accepts every request and only logs it.
#[derive(Debug, Default)]
pub struct LoggingPlayer;

impl MediaPlayer for LoggingPlayer {
    fn play(&mut self, element: &ElementId, src: &str) -> Result<()> {
        tracing::info!(%element, src, "play");
        Ok(())
    }
}

/// Background video cycling through a `data-playlist`.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    element: ElementId,
    sources: Vec<String>,
    index: usize,
    rejections: usize,
}

impl Playlist {
    /// `None` when the element lists no sources.
    pub fn from_markup(element: &ElementAttributes) -> Option<Self> {
        Self::new(element.id.clone(), markup::playlist(element))
    }

    pub fn new(element: ElementId, sources: Vec<String>) -> Option<Self> {
        if sources.is_empty() {
            return None;
        }
        Some(Self {
            element,
            sources,
            index: 0,
            rejections: 0,
        })
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.sources[self.index]
    }

    /// Number of play attempts the host has refused so far.
    pub fn rejections(&self) -> usize {
        self.rejections
    }

    pub fn start(&mut self, player: &mut dyn MediaPlayer) -> Vec<PresentationIntent> {
        self.load_current(player)
    }

    /// End-of-media: move to the next source, wrapping to the first.
    pub fn on_ended(&mut self, player: &mut dyn MediaPlayer) -> Vec<PresentationIntent> {
        self.index = (self.index + 1) % self.sources.len();
        self.load_current(player)
    }

    fn load_current(&mut self, player: &mut dyn MediaPlayer) -> Vec<PresentationIntent> {
        let src = self.current().to_string();
        match player.play(&self.element, &src) {
            Ok(()) => {}
            Err(err @ GalleryError::PlaybackRejected(_)) => {
                self.rejections += 1;
                tracing::debug!(%err, element = %self.element, "playback rejected");
            }
            Err(err) => {
                tracing::warn!(%err, element = %self.element, "playback failed");
            }
        }
        vec![PresentationIntent::SetMediaSource {
            element: self.element.clone(),
            src,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPlayer {
        reject: bool,
        played: Vec<String>,
    }

    impl MediaPlayer for RecordingPlayer {
        fn play(&mut self, _element: &ElementId, src: &str) -> Result<()> {
            self.played.push(src.to_string());
            if self.reject {
                Err(GalleryError::PlaybackRejected(src.to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn playlist() -> Playlist {
        let element =
            ElementAttributes::new("hero-video").with("data-playlist", "a.mp4,b.mp4,c.mp4");
        Playlist::from_markup(&element).expect("playlist should build")
    }

    #[test]
    fn advances_and_wraps_on_end() {
        let mut playlist = playlist();
        let mut player = RecordingPlayer::default();
        playlist.start(&mut player);
        for _ in 0..3 {
            playlist.on_ended(&mut player);
        }

        assert_eq!(player.played, vec!["a.mp4", "b.mp4", "c.mp4", "a.mp4"]);
        assert_eq!(playlist.index(), 0);
    }

    #[test]
    fn tolerates_repeated_rejection() {
        let mut playlist = playlist();
        let mut player = RecordingPlayer {
            reject: true,
            ..Default::default()
        };

        let intents = playlist.start(&mut player);
        playlist.on_ended(&mut player);
        playlist.on_ended(&mut player);

        assert_eq!(playlist.rejections(), 3);
        assert_eq!(playlist.current(), "c.mp4");
        assert_eq!(
            intents,
            vec![PresentationIntent::SetMediaSource {
                element: ElementId::new("hero-video"),
                src: "a.mp4".into(),
            }]
        );
    }

    #[test]
    fn empty_playlists_are_skipped() {
        assert!(Playlist::from_markup(&ElementAttributes::new("v")).is_none());
    }
}
