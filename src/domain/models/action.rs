pub enum Action {
    GeneratePortrait(),
    TogglePhoto(String),
}
