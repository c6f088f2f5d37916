//! Subcommands and their handlers.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use nextrep_core::{
    ApiClient, Config, FileUpload, NewPost, PostQuery, ReplyThread, SortOrder, Visibility,
};
use nextrep_core::models::MAX_ATTACHMENTS;
use tracing::warn;

use crate::format::{format_optional, format_timestamp, truncate_string};

/// Maximum characters of a post body shown in the feed
const FEED_PREVIEW_CHARS: usize = 120;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and log in
    Signup { username: String, email: String },
    /// Log in with a username or email
    Login { key: Option<String> },
    /// Forget the saved session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// List the feed
    Feed(FeedArgs),
    /// Show, create or delete posts
    #[command(subcommand)]
    Post(PostCommand),
    /// Show the replies to a post
    Replies { post_id: String },
    /// Reply to a post, or to another reply with --to-reply
    Reply {
        target_id: String,
        body: String,
        #[arg(long)]
        to_reply: bool,
    },
    /// Delete one of your replies
    ReplyDelete { reply_id: String },
    /// Search users by name
    Users { term: String },
    /// Show a user's profile
    User { user_id: String },
    Follow { user_id: String },
    Unfollow { user_id: String },
    Followers { user_id: String },
    Following { user_id: String },
    /// Edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Make your account public or private
    Visibility { visibility: Visibility },
    /// Print a download URL for an asset
    AssetUrl { asset_id: String },
}

#[derive(Debug, Args)]
pub struct FeedArgs {
    #[arg(long)]
    pub search: Option<String>,
    /// Sort order (default: descending)
    #[arg(long)]
    pub order: Option<SortOrder>,
    /// Maximum posts to show (default: 50)
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// Show a post with its attachments and replies
    Show { post_id: String },
    /// Publish a post (private unless --public)
    Create {
        title: String,
        body: String,
        /// File to attach (up to three)
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
        #[arg(long)]
        public: bool,
    },
    Delete { post_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    SetBio { bio: String },
    SetPronouns { pronouns: String },
    SetName { display_name: String },
    SetPicture { path: PathBuf },
}

pub async fn run(api: &ApiClient, config: &mut Config, command: Command) -> Result<()> {
    match command {
        Command::Signup { username, email } => {
            let password = prompt_password()?;
            api.sign_up(&username, &email, &password).await?;
            remember_username(config, &username);
            println!("Welcome to Nextrep, {}!", username);
        }
        Command::Login { key } => {
            let key = match key.or_else(|| config.last_username.clone()) {
                Some(key) => key,
                None => bail!("Give a username or email to log in with"),
            };
            let password = prompt_password()?;
            api.login(&key, &password).await?;
            remember_username(config, &key);
            println!("Logged in as {}", key);
        }
        Command::Logout => {
            api.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            require_session(api)?;
            let user = api.get_self_user().await?;
            let profile = api.get_self_profile().await?;
            println!("{} (@{}) id {}", user.display_label(), user.username, user.id);
            println!("  Pronouns: {}", format_optional(&profile.pronouns, "Not set"));
            println!("  Bio:      {}", format_optional(&profile.bio, "Not set"));
        }
        Command::Feed(args) => {
            let defaults = PostQuery::feed();
            let query = PostQuery {
                search_term: args.search,
                order: args.order.or(defaults.order),
                limit: args.limit.or(defaults.limit),
            };
            let posts = api.list_posts(&query).await?;
            if posts.is_empty() {
                println!("No posts yet");
            }
            for post in posts {
                println!(
                    "[{}] {}  {}",
                    post.id,
                    format_optional(&post.title, "(untitled)"),
                    format_timestamp(post.created_at.as_ref())
                );
                if let Some(ref body) = post.body {
                    println!("    {}", truncate_string(body, FEED_PREVIEW_CHARS));
                }
            }
        }
        Command::Post(cmd) => run_post(api, cmd).await?,
        Command::Replies { post_id } => {
            let thread = api.reply_thread(&post_id).await?;
            print_thread(&thread);
        }
        Command::Reply {
            target_id,
            body,
            to_reply,
        } => {
            require_session(api)?;
            let reply = if to_reply {
                api.reply_to_reply(&target_id, &body).await?
            } else {
                api.reply_to_post(&target_id, &body).await?
            };
            println!("Reply {} posted", reply.id);
        }
        Command::ReplyDelete { reply_id } => {
            require_session(api)?;
            api.delete_reply(&reply_id).await?;
            println!("Reply deleted");
        }
        Command::Users { term } => {
            let users = api.search_users(&term).await?;
            if users.is_empty() {
                println!("No users match '{}'", term);
            }
            for user in users {
                println!("[{}] {} (@{})", user.id, user.display_label(), user.username);
            }
        }
        Command::User { user_id } => show_user(api, &user_id).await?,
        Command::Follow { user_id } => {
            require_session(api)?;
            api.follow(&user_id).await?;
            println!("Following {}", user_id);
        }
        Command::Unfollow { user_id } => {
            require_session(api)?;
            api.unfollow(&user_id).await?;
            println!("Unfollowed {}", user_id);
        }
        Command::Followers { user_id } => {
            for user in api.followers(&user_id).await? {
                println!("[{}] {} (@{})", user.id, user.display_label(), user.username);
            }
        }
        Command::Following { user_id } => {
            for user in api.following(&user_id).await? {
                println!("[{}] {} (@{})", user.id, user.display_label(), user.username);
            }
        }
        Command::Profile(cmd) => {
            require_session(api)?;
            let profile = match cmd {
                ProfileCommand::SetBio { bio } => api.update_bio(&bio).await?,
                ProfileCommand::SetPronouns { pronouns } => api.update_pronouns(&pronouns).await?,
                ProfileCommand::SetName { display_name } => {
                    api.update_display_name(&display_name).await?
                }
                ProfileCommand::SetPicture { path } => {
                    api.update_profile_picture(FileUpload::from_path(&path)?).await?
                }
            };
            println!(
                "Profile updated: {}",
                format_optional(&profile.display_name, "(no display name)")
            );
        }
        Command::Visibility { visibility } => {
            require_session(api)?;
            api.update_visibility(visibility).await?;
            println!("Account is now {}", visibility);
        }
        Command::AssetUrl { asset_id } => {
            println!("{}", api.asset_url(&asset_id).await?);
        }
    }
    Ok(())
}

async fn run_post(api: &ApiClient, cmd: PostCommand) -> Result<()> {
    match cmd {
        PostCommand::Show { post_id } => {
            let post = api.get_post(&post_id).await?;
            println!("{}", format_optional(&post.title, "(untitled)"));
            println!("{}", format_timestamp(post.created_at.as_ref()));
            if let Some(ref body) = post.body {
                println!("\n{}\n", body);
            }
            for url in api.attachment_urls(&post_id).await? {
                println!("  attachment: {}", url);
            }
            print_thread(&api.reply_thread(&post_id).await?);
        }
        PostCommand::Create {
            title,
            body,
            attachments,
            public,
        } => {
            require_session(api)?;
            if attachments.len() > MAX_ATTACHMENTS {
                bail!("A post can have at most {} attachments", MAX_ATTACHMENTS);
            }
            let visibility = if public {
                Visibility::Public
            } else {
                Visibility::Private
            };
            let mut post = NewPost::new(title, body).with_visibility(visibility);
            for path in &attachments {
                post = post.with_attachment(FileUpload::from_path(path)?);
            }
            let response = api.create_post(&post).await?;
            println!("{}", response.message().unwrap_or("Post created"));
        }
        PostCommand::Delete { post_id } => {
            require_session(api)?;
            api.delete_post(&post_id).await?;
            println!("Post deleted");
        }
    }
    Ok(())
}

async fn show_user(api: &ApiClient, user_id: &str) -> Result<()> {
    let summary = api.profile_summary(user_id).await?;
    println!("{} (@{})", summary.display_label(), summary.user.username);
    if let Some(ref profile) = summary.profile {
        if let Some(ref pronouns) = profile.pronouns {
            println!("  {}", pronouns);
        }
        if let Some(ref bio) = profile.bio {
            println!("  {}", bio);
        }
    }
    println!(
        "  {} followers, {} following",
        summary.followers_count, summary.following_count
    );
    if let Some(url) = api.profile_picture_url(user_id).await? {
        println!("  picture: {}", url);
    }

    if api.is_authenticated() {
        let me = api.get_self_user().await?;
        if me.id != summary.user.id && api.is_following(user_id, &me.id).await? {
            println!("  You follow this user");
        }
    }
    Ok(())
}

fn print_thread(thread: &ReplyThread) {
    if thread.is_empty() {
        println!("No replies");
        return;
    }
    for reply in &thread.top_level {
        println!("- [{}] {}", reply.id, reply.body);
        for child in thread.children(&reply.id) {
            println!("    - [{}] {}", child.id, child.body);
        }
    }
}

fn require_session(api: &ApiClient) -> Result<()> {
    if !api.is_authenticated() {
        bail!("Not logged in. Run `nextrep login` first.");
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

fn remember_username(config: &mut Config, username: &str) {
    config.last_username = Some(username.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}
