use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CharacterForm;
use crate::domain::models::Photo;
use crate::domain::models::TranslatorName;
use crate::domain::services::Drafts;
use crate::domain::services::Gallery;
use crate::infrastructure::api::CatalogClient;
use crate::infrastructure::api::CharacterClient;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn format_photo(photo: &Photo) -> String {
    let mut res = format!("- (ID: {}) {}", photo.id, photo.url);

    if let Some(seconds) = photo.generation_time_seconds {
        res = format!("{res}, generated in {seconds:.1}s");
    }

    if photo.is_selected {
        res = format!("{res} {}", "[main card]".green());
    }

    return res;
}

fn format_form(form: &CharacterForm) -> String {
    let mut lines = vec![
        format!("Name: {}", form.name),
        format!("Personality: {}", form.personality),
        format!("Backstory: {}", form.backstory),
        format!("Appearance: {}", form.appearance),
        format!("Location: {}", form.location),
    ];

    if let Some(custom_prompt) = &form.custom_prompt {
        lines.push(format!("Custom prompt: {custom_prompt}"));
    }
    if !form.tags.is_empty() {
        lines.push(format!("Tags: {}", form.tags.join(", ")));
    }
    if let Some(voice_id) = &form.voice_id {
        lines.push(format!("Voice: {voice_id}"));
    }

    return lines.join("\n");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

/// Applies any draft fields passed on the command line on top of the stored
/// draft, so the wizard can be filled in over several invocations.
async fn update_draft(set_matches: &ArgMatches) -> Result<()> {
    let drafts = Drafts::default();
    let mut form = drafts.load_or_default().await?;

    if let Some(name) = set_matches.get_one::<String>("name") {
        form.name = name.to_string();
    }
    if let Some(personality) = set_matches.get_one::<String>("personality") {
        form.personality = personality.to_string();
    }
    if let Some(backstory) = set_matches.get_one::<String>("backstory") {
        form.backstory = backstory.to_string();
    }
    if let Some(appearance) = set_matches.get_one::<String>("appearance") {
        form.appearance = appearance.to_string();
    }
    if let Some(location) = set_matches.get_one::<String>("location") {
        form.location = location.to_string();
    }
    if let Some(custom_prompt) = set_matches.get_one::<String>("prompt") {
        form.custom_prompt = Some(custom_prompt.to_string());
    }
    if let Some(tags) = set_matches.get_one::<String>("tags") {
        form.tags = tags
            .split(',')
            .map(|e| return e.trim().to_string())
            .filter(|e| return !e.is_empty())
            .collect();
    }
    if let Some(voice_id) = set_matches.get_one::<String>("voice-id") {
        form.voice_id = Some(voice_id.to_string());
    }

    drafts.save(&form).await?;
    println!("{}", format_form(&form));
    return Ok(());
}

async fn create_character() -> Result<()> {
    let drafts = Drafts::default();
    let form = drafts.load().await?;

    CharacterClient::default().create(&form).await?;
    drafts.delete().await?;

    println!("{} was created.", form.name);
    return Ok(());
}

async fn print_photos_list(character: &str) -> Result<()> {
    let record = CharacterClient::default().get(character).await?;

    if record.photos.is_empty() {
        println!("{character} has no photos yet. Generate some!");
        return Ok(());
    }

    let photos = record
        .photos
        .iter()
        .map(|photo| {
            return format_photo(photo);
        })
        .collect::<Vec<String>>();

    println!("{}", photos.join("\n"));
    return Ok(());
}

/// Flips a photo in or out of the main card and persists the new set in one
/// shot. Unlike the interactive session there is nothing to roll back here;
/// a failed write simply leaves the platform untouched.
async fn toggle_photo(character: &str, photo_id: &str) -> Result<()> {
    let client = CharacterClient::default();
    let record = client.get(character).await?;

    let mut gallery = Gallery::from_record(&record);
    let write = gallery.toggle(photo_id)?;
    client.set_main_photos(character, &write.photos).await?;

    if write.photos.iter().any(|e| return e.id == photo_id) {
        println!("Added {photo_id} to {character}'s main card.");
    } else {
        println!("Removed {photo_id} from {character}'s main card.");
    }

    return Ok(());
}

async fn clone_voice(name: &str, file: &str) -> Result<()> {
    let audio = fs::read(file).await?;
    let voice = CatalogClient::default().clone_voice(name, &audio).await?;

    println!("Created voice {} with id {}.", voice.name, voice.id);
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Maquette")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Maquette with environment variable RUST_LOG=maquette")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_draft() -> Command {
    return Command::new("draft")
        .about("Build up a character draft before creating them.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the drafts cache directory path."))
        .subcommand(Command::new("show").about("Print the draft in progress."))
        .subcommand(Command::new("discard").about("Throw away the draft in progress."))
        .subcommand(
            Command::new("set")
                .about("Set fields on the draft. Only the fields you pass change.")
                .arg(Arg::new("name").long("name").num_args(1).help("The character's name."))
                .arg(Arg::new("personality").long("personality").num_args(1).help("How the character behaves in chat."))
                .arg(Arg::new("backstory").long("backstory").num_args(1).help("Where the character comes from."))
                .arg(Arg::new("appearance").long("appearance").num_args(1).help("What the character looks like. Feeds portrait prompts."))
                .arg(Arg::new("location").long("location").num_args(1).help("Where portraits place the character."))
                .arg(Arg::new("prompt").long("prompt").num_args(1).help("A custom portrait prompt. Replaces the appearance and location assembly entirely."))
                .arg(Arg::new("tags").long("tags").num_args(1).help("Comma separated tag names."))
                .arg(Arg::new("voice-id").long("voice-id").num_args(1).help("A voice id from the voice catalog.")),
        );
}

fn subcommand_character() -> Command {
    return Command::new("character")
        .about("Create and inspect characters on the platform.")
        .arg_required_else_help(true)
        .subcommand(Command::new("create").about(
            "Create a character from the finished draft. The draft is deleted on success.",
        ))
        .subcommand(
            Command::new("show")
                .about("Print a character as the platform stores it.")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Character name")
                        .required(true),
                ),
        );
}

fn subcommand_photos() -> Command {
    return Command::new("photos")
        .about("Manage a character's gallery and main card.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List a character's photos, marking the main card.")
                .arg(
                    Arg::new("character")
                        .short('n')
                        .long("character")
                        .help("Character name")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("toggle")
                .about("Flip a photo in or out of the main card. The card holds up to three photos.")
                .arg(
                    Arg::new("character")
                        .short('n')
                        .long("character")
                        .help("Character name")
                        .required(true),
                )
                .arg(
                    Arg::new("photo-id")
                        .short('i')
                        .long("id")
                        .help("Photo ID")
                        .required(true),
                ),
        );
}

fn subcommand_tags() -> Command {
    return Command::new("tags")
        .about("Browse the platform tag catalog.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all tags characters can carry."));
}

fn subcommand_voices() -> Command {
    return Command::new("voices")
        .about("Browse the voice catalog and clone new voices.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all voices characters can speak with."))
        .subcommand(
            Command::new("clone")
                .about("Clone a new voice from a local audio sample.")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("A name for the new voice.")
                        .required(true),
                )
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .help("Path to the audio sample.")
                        .required(true),
                ),
        );
}

fn subcommand_generate() -> Command {
    return Command::new("generate")
        .about("Generate portraits for the drafted character.")
        .arg(
            Arg::new(ConfigKey::GenerateCount.to_string())
                .short('N')
                .long(ConfigKey::GenerateCount.to_string())
                .num_args(1)
                .help(format!(
                    "How many portraits to request. [default: {}]",
                    Config::default(ConfigKey::GenerateCount)
                )),
        )
        .arg(
            Arg::new(ConfigKey::PromptOverride.to_string())
                .short('p')
                .long(ConfigKey::PromptOverride.to_string())
                .num_args(1)
                .help("A one-off prompt to use instead of the draft's appearance."),
        );
}

fn config_env(key: ConfigKey) -> String {
    return format!("MAQUETTE_{}", key.to_string().replace('-', "_").to_uppercase());
}

fn config_arg(key: ConfigKey, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(config_env(key))
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default(key)))
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env(config_env(ConfigKey::Model))
        .num_args(1)
        .help(format!(
            "The image model portraits are generated with. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

fn arg_translator() -> Arg {
    return Arg::new(ConfigKey::Translator.to_string())
        .long(ConfigKey::Translator.to_string())
        .env(config_env(ConfigKey::Translator))
        .num_args(1)
        .help(format!(
            "How prompts are translated to English before submission. [default: {}]",
            Config::default(ConfigKey::Translator)
        ))
        .value_parser(PossibleValuesParser::new(TranslatorName::VARIANTS))
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("maquette")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_character())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_draft())
        .subcommand(subcommand_generate())
        .subcommand(subcommand_photos())
        .subcommand(subcommand_tags())
        .subcommand(subcommand_voices())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env(config_env(ConfigKey::ConfigFile))
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(arg_model())
        .arg(arg_translator())
        .arg(config_arg(ConfigKey::ApiUrl, "The platform API URL."))
        .arg(config_arg(
            ConfigKey::AuthToken,
            "The bearer token used to authenticate against the platform.",
        ))
        .arg(config_arg(
            ConfigKey::RefreshToken,
            "The token used to mint a new bearer token when the current one expires.",
        ))
        .arg(config_arg(
            ConfigKey::TranslateUrl,
            "Translation service URL when using the api translator.",
        ))
        .arg(config_arg(
            ConfigKey::HealthCheckTimeout,
            "Time to wait in milliseconds before timing out when doing a healthcheck for the portrait service.",
        ))
        .arg(config_arg(ConfigKey::Width, "Portrait width in pixels."))
        .arg(config_arg(ConfigKey::Height, "Portrait height in pixels."))
        .arg(config_arg(
            ConfigKey::Steps,
            "How many diffusion steps each portrait runs.",
        ))
        .arg(config_arg(
            ConfigKey::CfgScale,
            "How strongly the portrait follows the prompt.",
        ))
        .arg(config_arg(
            ConfigKey::NegativePrompt,
            "What every portrait should avoid.",
        ))
        .arg(config_arg(
            ConfigKey::GenerationCost,
            "How many coins one portrait costs.",
        ))
        .arg(config_arg(
            ConfigKey::PollInterval,
            "Milliseconds between polls of an in-flight generation.",
        ))
        .arg(config_arg(
            ConfigKey::PollAttempts,
            "How many polls to make before giving up on a generation.",
        ))
        .arg(config_arg(
            ConfigKey::QueueDelay,
            "Milliseconds to wait before submitting a request that left the queue.",
        ))
        .arg(config_arg(
            ConfigKey::Username,
            "Your display name on the platform.",
        ));
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = dirs::cache_dir().unwrap().join("maquette/debug.log");
                    println!("{}", log_path.to_str().unwrap());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("draft", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("dir", _)) => {
                    let dir = Drafts::default().cache_dir.to_string_lossy().to_string();
                    println!("{dir}");
                }
                Some(("show", _)) => {
                    let form = Drafts::default().load().await?;
                    println!("{}", format_form(&form));
                }
                Some(("discard", _)) => {
                    Drafts::default().delete().await?;
                    println!("Draft discarded.");
                }
                Some(("set", set_matches)) => {
                    update_draft(set_matches).await?;
                }
                _ => {
                    subcommand_draft().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("character", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;

            match subcmd_matches.subcommand() {
                Some(("create", _)) => {
                    create_character().await?;
                }
                Some(("show", show_matches)) => {
                    let name = show_matches.get_one::<String>("name").unwrap();
                    let record = CharacterClient::default().get(name).await?;
                    println!("{}", serde_yaml::to_string(&record)?);
                }
                _ => {
                    subcommand_character().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("photos", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;

            match subcmd_matches.subcommand() {
                Some(("list", list_matches)) => {
                    let character = list_matches.get_one::<String>("character").unwrap();
                    print_photos_list(character).await?;
                }
                Some(("toggle", toggle_matches)) => {
                    let character = toggle_matches.get_one::<String>("character").unwrap();
                    let photo_id = toggle_matches.get_one::<String>("photo-id").unwrap();
                    toggle_photo(character, photo_id).await?;
                }
                _ => {
                    subcommand_photos().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("tags", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;

            if let Some(("list", _)) = subcmd_matches.subcommand() {
                let tags = CatalogClient::default()
                    .tags()
                    .await?
                    .iter()
                    .map(|tag| {
                        return format!("- {} ({})", tag.name, tag.category);
                    })
                    .collect::<Vec<String>>();
                println!("{}", tags.join("\n"));
            } else {
                subcommand_tags().print_long_help()?;
            }

            return Ok(false);
        }
        Some(("voices", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;

            match subcmd_matches.subcommand() {
                Some(("list", _)) => {
                    let voices = CatalogClient::default()
                        .voices()
                        .await?
                        .iter()
                        .map(|voice| {
                            return format!("- (ID: {}) {}", voice.id, voice.name);
                        })
                        .collect::<Vec<String>>();
                    println!("{}", voices.join("\n"));
                }
                Some(("clone", clone_matches)) => {
                    let name = clone_matches.get_one::<String>("name").unwrap();
                    let file = clone_matches.get_one::<String>("file").unwrap();
                    clone_voice(name, file).await?;
                }
                _ => {
                    subcommand_voices().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
