use ember_api::{ApiClient, ApiError, NewUser, NotificationSettings, User, UserUpdate, Video, download_url};

pub(crate) fn new_user(
    username: String,
    email: String,
    password: String,
    address: Option<String>,
    phone_number: Option<String>,
) -> NewUser {
    NewUser {
        username,
        email,
        password,
        address,
        phone_number,
    }
}

fn print_user(user: &User) {
    println!("{}  {}  <{}>  {}", user.user_id, user.username, user.email, user.role);
    if let Some(address) = &user.address {
        println!("  address: {address}");
    }
    if let Some(phone) = &user.phone_number {
        println!("  phone:   {phone}");
    }
}

fn print_video(video: &Video) {
    let source = video
        .youtube_url
        .as_deref()
        .or(video.file_name.as_deref())
        .unwrap_or("-");
    println!(
        "{}  {:<10}  fire: {:<3}  {}  {}",
        video.video_id,
        video.status,
        if video.fire_detected { "yes" } else { "no" },
        video.created_at.as_deref().unwrap_or("-"),
        source
    );
}

pub(crate) async fn login(client: &mut ApiClient, email: &str, password: &str) -> Result<(), ApiError> {
    let session = client.login(email, password).await?;
    println!(
        "logged in as {}{}",
        session.email.as_deref().unwrap_or(email),
        if session.is_admin() { " (admin)" } else { "" }
    );
    Ok(())
}

pub(crate) fn logout(client: &mut ApiClient) -> Result<(), ApiError> {
    client.logout()?;
    println!("logged out");
    Ok(())
}

pub(crate) async fn whoami(client: &mut ApiClient) -> Result<(), ApiError> {
    if !client.session().authenticated {
        println!("not logged in");
        return Ok(());
    }
    let user = client.me().await?;
    print_user(&user);
    Ok(())
}

pub(crate) async fn register(client: &mut ApiClient, user: &NewUser) -> Result<(), ApiError> {
    let created = client.register(user).await?;
    println!("registered {}, you can log in now", created.email);
    Ok(())
}

pub(crate) async fn profile(
    client: &mut ApiClient,
    username: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
) -> Result<(), ApiError> {
    let update = UserUpdate {
        username,
        address,
        phone_number,
    };
    let user = if update == UserUpdate::default() {
        client.me().await?
    } else {
        client.update_me(&update).await?
    };
    print_user(&user);
    Ok(())
}

pub(crate) async fn videos(client: &mut ApiClient, all: bool) -> Result<(), ApiError> {
    let videos = if all {
        client.all_videos().await?
    } else {
        client.videos().await?
    };
    if videos.is_empty() {
        println!("no videos");
    }
    for video in &videos {
        print_video(video);
    }
    Ok(())
}

pub(crate) async fn video(client: &mut ApiClient, video_id: &str) -> Result<(), ApiError> {
    let video = client.video(video_id).await?;
    print_video(&video);
    if let Some(url) = &video.original_video_url {
        println!("  original:  {url}");
    }
    if let Some(url) = &video.processed_video_url {
        println!("  processed: {url}");
        println!("  download:  {}", download_url(url));
    }
    for detection in &video.fire_detections {
        let start = detection.fire_start_time.unwrap_or_default();
        let end = detection.fire_end_time.unwrap_or(start);
        println!(
            "  fire {:.1}s..{:.1}s  confidence {:.2}",
            start, end, detection.confidence
        );
    }
    Ok(())
}

pub(crate) async fn history(client: &mut ApiClient, user_id: Option<&str>) -> Result<(), ApiError> {
    let entries = match user_id {
        Some(user_id) => client.user_history(user_id).await?,
        None => client.my_history().await?,
    };
    if entries.is_empty() {
        println!("no history");
    }
    for entry in &entries {
        println!(
            "{}  {:<16}  {}",
            entry.created_at.as_deref().unwrap_or("-"),
            entry.action_type,
            entry.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub(crate) async fn users(client: &mut ApiClient) -> Result<(), ApiError> {
    for user in client.users().await? {
        print_user(&user);
    }
    Ok(())
}

pub(crate) async fn user(client: &mut ApiClient, user_id: &str) -> Result<(), ApiError> {
    print_user(&client.user(user_id).await?);
    Ok(())
}

pub(crate) async fn add_user(client: &mut ApiClient, user: &NewUser) -> Result<(), ApiError> {
    let created = client.add_user(user).await?;
    print_user(&created);
    Ok(())
}

/// Print the notification settings, updating the given fields first.
pub(crate) async fn notifications(
    client: &mut ApiClient,
    email: Option<bool>,
    website: Option<bool>,
) -> Result<(), ApiError> {
    let mut settings = client.notification_settings().await?;
    if email.is_some() || website.is_some() {
        settings = NotificationSettings {
            enable_email_notification: email.unwrap_or(settings.enable_email_notification),
            enable_website_notification: website.unwrap_or(settings.enable_website_notification),
        };
        settings = client.set_notification_settings(&settings).await?;
    }
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    println!("email:   {}", on_off(settings.enable_email_notification));
    println!("website: {}", on_off(settings.enable_website_notification));
    Ok(())
}
