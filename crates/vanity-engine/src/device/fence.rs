/// The last submission made for one frame parity.
///
/// An unarmed fence has nothing to wait for.
#[derive(Debug, Default)]
pub(crate) struct FrameFence {
    submission: Option<wgpu::SubmissionIndex>,
}

impl FrameFence {
    pub(crate) fn arm(&mut self, submission: wgpu::SubmissionIndex) {
        self.submission = Some(submission);
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.submission.is_some()
    }

    /// Blocks until the armed submission has completed, then disarms.
    pub(crate) fn wait(&mut self, device: &wgpu::Device) {
        let Some(index) = self.submission.take() else {
            return;
        };
        let wait = wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: None,
        };
        if let Err(e) = device.poll(wait) {
            log::error!("device lost while waiting on a frame fence: {e}");
        }
    }

    pub(crate) fn disarm(&mut self) {
        self.submission = None;
    }
}
