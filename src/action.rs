#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
  Quit,
  MoveUp,
  MoveDown,
  GoToTop,
  GoToBottom,
  Open,
  Back,
  Reload,
  Edit,
  Preview,
  NextPage,
  PrevPage,
  FirstPage,
  ToggleContentType,
  ViewerScrollUp,
  ViewerScrollDown,
  ViewerPageUp,
  ViewerPageDown,
  ViewerTop,
  ViewerBottom,
  ViewerBack,
  ViewerClose,
  FilterStart,
  FilterInput(char),
  FilterBackspace,
  FilterConfirm,
  FilterCancel,
  Resize(u16, u16),
  Tick,
  None,
}

impl Action {
  pub fn from_name(name: &str) -> Option<Action> {
    match name {
      "quit" => Some(Action::Quit),
      "move_up" => Some(Action::MoveUp),
      "move_down" => Some(Action::MoveDown),
      "go_to_top" => Some(Action::GoToTop),
      "go_to_bottom" => Some(Action::GoToBottom),
      "open" => Some(Action::Open),
      "back" => Some(Action::Back),
      "reload" => Some(Action::Reload),
      "edit" => Some(Action::Edit),
      "preview" => Some(Action::Preview),
      "next_page" => Some(Action::NextPage),
      "prev_page" => Some(Action::PrevPage),
      "first_page" => Some(Action::FirstPage),
      "toggle_content_type" => Some(Action::ToggleContentType),
      "scroll_up" => Some(Action::ViewerScrollUp),
      "scroll_down" => Some(Action::ViewerScrollDown),
      "page_up" => Some(Action::ViewerPageUp),
      "page_down" => Some(Action::ViewerPageDown),
      "top" => Some(Action::ViewerTop),
      "bottom" => Some(Action::ViewerBottom),
      "viewer_back" => Some(Action::ViewerBack),
      "close" => Some(Action::ViewerClose),
      "filter" => Some(Action::FilterStart),
      "none" => Some(Action::None),
      _ => None,
    }
  }
}
