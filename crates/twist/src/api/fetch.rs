//! Resource fetchers: one request, typed and verified records.

use twist_core::cursor::{
    after_id_param, CommentWindow, MAX_COMMENTS_PER_PAGE, MAX_THREADS_PER_PAGE,
};
use twist_core::model::{Channel, Comment, Message, Thread, User, Workspace};
use twist_core::ordering::{check_comment_window, check_threads_sorted};

use super::TwistClient;
use crate::cancel::Cancellation;
use crate::error::Error;

/// Messages returned by `conversation_messages/get`, the most recent first.
pub const MAX_MESSAGES: usize = 500;

fn require_id(id: u64, resource: &'static str) -> Result<(), Error> {
    if id == 0 {
        Err(Error::InvalidId(resource))
    } else {
        Ok(())
    }
}

impl TwistClient {
    /// All the workspaces the user has access to.
    pub async fn workspaces(&self, cancel: &Cancellation) -> Result<Vec<Workspace>, Error> {
        let request = self.get("workspaces/get", &[]);
        self.fetch_json(request, cancel)
            .await
            .map_err(|e| e.context("fetching workspaces"))
    }

    /// All the channels in a workspace.
    pub async fn channels(
        &self,
        workspace_id: u64,
        cancel: &Cancellation,
    ) -> Result<Vec<Channel>, Error> {
        let context = || format!("fetching channels of workspace {workspace_id}");
        require_id(workspace_id, "workspace").map_err(|e| e.context(context()))?;

        let request = self.get(
            "channels/get",
            &[("workspace_id", workspace_id.to_string())],
        );
        self.fetch_json(request, cancel)
            .await
            .map_err(|e| e.context(context()))
    }

    /// All the members of a workspace.
    pub async fn users(&self, workspace_id: u64, cancel: &Cancellation) -> Result<Vec<User>, Error> {
        let context = || format!("fetching users of workspace {workspace_id}");
        require_id(workspace_id, "workspace").map_err(|e| e.context(context()))?;

        let request = self.get("workspaces/get_users", &[("id", workspace_id.to_string())]);
        self.fetch_json(request, cancel)
            .await
            .map_err(|e| e.context(context()))
    }

    /// A single thread.
    pub async fn thread(&self, thread_id: u64, cancel: &Cancellation) -> Result<Thread, Error> {
        let context = || format!("fetching thread {thread_id}");
        require_id(thread_id, "thread").map_err(|e| e.context(context()))?;

        let request = self.get("threads/getone", &[("id", thread_id.to_string())]);
        self.fetch_json(request, cancel)
            .await
            .map_err(|e| e.context(context()))
    }

    /// Up to [`MAX_THREADS_PER_PAGE`] threads of a channel with ids above
    /// `after_id`, ascending by id. Use [`ThreadsPaginator`](super::paginate::ThreadsPaginator)
    /// to read a whole channel.
    pub async fn threads_page(
        &self,
        channel_id: u64,
        after_id: u64,
        cancel: &Cancellation,
    ) -> Result<Vec<Thread>, Error> {
        let context = || format!("fetching threads of channel {channel_id} after {after_id}");
        require_id(channel_id, "channel").map_err(|e| e.context(context()))?;

        let request = self.post_form(
            "threads/get",
            &[
                ("channel_id", channel_id.to_string()),
                ("limit", MAX_THREADS_PER_PAGE.to_string()),
                ("order_by", "asc".to_string()),
                ("after_id", after_id_param(after_id)),
            ],
        );

        let threads: Vec<Thread> = self
            .fetch_json(request, cancel)
            .await
            .map_err(|e| e.context(context()))?;
        check_threads_sorted(&threads).map_err(|e| Error::from(e).context(context()))?;
        Ok(threads)
    }

    /// Up to [`MAX_COMMENTS_PER_PAGE`] comments of a thread.
    ///
    /// Exact windows are checked for ordering and gaps; loose windows are
    /// returned as the server sent them.
    pub async fn comments_page(
        &self,
        thread_id: u64,
        window: CommentWindow,
        cancel: &Cancellation,
    ) -> Result<Vec<Comment>, Error> {
        let context = || format!("fetching comments of thread {thread_id} ({window:?})");
        require_id(thread_id, "thread").map_err(|e| e.context(context()))?;

        let mut params = vec![
            ("thread_id", thread_id.to_string()),
            ("limit", MAX_COMMENTS_PER_PAGE.to_string()),
        ];
        params.extend(window.params());
        let request = self.get("comments/get", &params);

        let comments: Vec<Comment> = self
            .fetch_json(request, cancel)
            .await
            .map_err(|e| e.context(context()))?;

        if let CommentWindow::Exact { .. } = window {
            check_comment_window(&comments, window.expected_start())
                .map_err(|e| Error::from(e).context(context()))?;
        }
        Ok(comments)
    }

    /// The latest [`MAX_MESSAGES`] messages of a conversation, oldest first.
    pub async fn conversation_messages(
        &self,
        conversation_id: u64,
        cancel: &Cancellation,
    ) -> Result<Vec<Message>, Error> {
        let context = || format!("fetching messages of conversation {conversation_id}");
        require_id(conversation_id, "conversation").map_err(|e| e.context(context()))?;

        let request = self.get(
            "conversation_messages/get",
            &[
                ("conversation_id", conversation_id.to_string()),
                ("limit", MAX_MESSAGES.to_string()),
            ],
        );
        self.fetch_json(request, cancel)
            .await
            .map_err(|e| e.context(context()))
    }
}
