use crate::events::AppEvent;
use crate::gui::keys::{self, KeyInput};
use crate::gui::scene::CairoScene;
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use phasering::config::{self, Config};
use phasering::diagram::{Diagram, DiagramError};
use phasering::geometry::{Point, Size};
use phasering::highlight::{Interaction, Key, Target};
use phasering::schedule::{Debouncer, Tick};
use relm4::prelude::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::runtime::Handle;

type SharedDiagram = Rc<RefCell<Option<Diagram<CairoScene>>>>;

pub struct AppModel {
    pub diagram: SharedDiagram,
    pub config_path: PathBuf,
    pub runtime: Handle,
    pub debouncer: Debouncer<Size>,
    pub tick_tx: async_channel::Sender<Tick<Size>>,
    pub size: Option<Size>,
    pub hovered: Option<Target>,
    pub focused: Option<usize>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Resize(Size),
    Relayout(Tick<Size>),
    PointerMove(Point),
    PointerLeave,
    FocusLost,
    Key(KeyInput),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

pub fn build_diagram(config: &Config) -> Result<Diagram<CairoScene>, DiagramError> {
    Diagram::init(
        Some(CairoScene::default()),
        config.items(),
        config.options(),
    )
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, PathBuf, Handle, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Phasewheel"),
            set_default_size: (800, 800),
            add_css_class: "phasewheel-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    match KeyInput::from_key(key) {
                        Some(input) => {
                            sender.input(AppMsg::Key(input));
                            glib::Propagation::Stop
                        }
                        None => glib::Propagation::Proceed,
                    }
                }
            },

            add_controller = gtk::EventControllerFocus {
                connect_leave[sender] => move |_| {
                    sender.input(AppMsg::FocusLost);
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                set_focusable: true,
                add_css_class: "phasewheel-drawing-area",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resize(Size::new(width as f64, height as f64)));
                },

                add_controller = gtk::EventControllerMotion {
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::PointerMove(Point::new(x, y)));
                    },
                    connect_leave[sender] => move |_| {
                        sender.input(AppMsg::PointerLeave);
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, config_path, runtime, rx) = init;

        theme::load_css();

        let diagram = match build_diagram(&config) {
            Ok(d) => Some(d),
            Err(e) => {
                log::error!("Diagram not initialised: {}", e);
                None
            }
        };

        let (tick_tx, tick_rx) = async_channel::unbounded();
        let model = AppModel {
            diagram: Rc::new(RefCell::new(diagram)),
            config_path,
            debouncer: Debouncer::new(runtime.clone(), config.debounce(), tick_tx.clone()),
            runtime,
            tick_tx,
            size: None,
            hovered: None,
            focused: None,
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let diagram_draw = model.diagram.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                if let Some(diagram) = diagram_draw.borrow().as_ref()
                    && let Err(e) = diagram.surface().paint(cr, &colors)
                {
                    log::error!("Drawing error: {}", e);
                }
            });

        {
            let sender = sender.clone();
            relm4::spawn(async move {
                while let Ok(event) = rx.recv().await {
                    sender.input(AppMsg::from(event));
                }
            });
        }
        relm4::spawn(async move {
            while let Ok(tick) = tick_rx.recv().await {
                sender.input(AppMsg::Relayout(tick));
            }
        });

        root.present();
        widgets.drawing_area.grab_focus();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Resize(size) => {
                // the first size is the initial ready signal, later ones are a resize burst
                if self.size.is_none() {
                    self.debouncer.schedule_now(size);
                } else {
                    self.debouncer.schedule(size);
                }
                self.size = Some(size);
            }
            AppMsg::Relayout(tick) => {
                if !self.debouncer.is_current(&tick) {
                    log::trace!("Dropping stale relayout {}", tick.generation);
                    return;
                }
                self.relayout(tick.value);
            }
            AppMsg::PointerMove(point) => {
                let target = self
                    .diagram
                    .borrow()
                    .as_ref()
                    .and_then(|d| d.hit_test(point));
                self.hover(target);
            }
            AppMsg::PointerLeave => self.hover(None),
            AppMsg::FocusLost => {
                let active = self
                    .diagram
                    .borrow()
                    .as_ref()
                    .and_then(|d| d.highlight().active());
                if let Some(k) = active {
                    self.dispatch(Interaction::FocusOut(Target::Item(k)));
                }
                self.focused = None;
            }
            AppMsg::Key(input) => self.key(input),
            AppMsg::ConfigReload => match config::load_config_from(&self.config_path) {
                Ok(new_config) => {
                    self.reload(&new_config);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn step_count(&self) -> usize {
        self.diagram
            .borrow()
            .as_ref()
            .map_or(0, |d| d.items().len())
    }

    fn dispatch(&self, event: Interaction) {
        if let Some(diagram) = self.diagram.borrow_mut().as_mut() {
            diagram.handle(event);
        }
        self.drawing_area.queue_draw();
    }

    fn relayout(&self, size: Size) {
        if let Some(diagram) = self.diagram.borrow_mut().as_mut() {
            let pass = diagram.relayout(size);
            log::debug!(
                "Relayout at {}x{}: {} steps, {} connectors",
                size.width,
                size.height,
                pass.placements.len(),
                pass.connectors.len()
            );
        }
        self.drawing_area.queue_draw();
    }

    fn hover(&mut self, target: Option<Target>) {
        if target == self.hovered {
            return;
        }
        if let Some(prev) = self.hovered {
            self.dispatch(Interaction::PointerLeave(prev));
        }
        if let Some(next) = target {
            self.dispatch(Interaction::PointerEnter(next));
        }
        self.hovered = target;
    }

    fn key(&mut self, input: KeyInput) {
        let count = self.step_count();
        match input {
            KeyInput::Digit(k) if k < count => self.focus(k),
            KeyInput::Digit(_) => {}
            KeyInput::Next | KeyInput::Previous => {
                let delta = if input == KeyInput::Next { 1 } else { -1 };
                if let Some(k) = keys::step_focus(self.focused, delta, count) {
                    self.focus(k);
                }
            }
            KeyInput::Activate(key) => {
                if let Some(index) = self.focused {
                    self.dispatch(Interaction::KeyPress { index, key });
                }
            }
            KeyInput::Escape => {
                self.dispatch(Interaction::KeyPress {
                    index: self.focused.unwrap_or_default(),
                    key: Key::Escape,
                });
                self.focused = None;
            }
        }
    }

    fn focus(&mut self, index: usize) {
        self.focused = Some(index);
        self.dispatch(Interaction::KeyPress {
            index,
            key: Key::Enter,
        });
    }

    fn reload(&mut self, config: &Config) {
        let diagram = match build_diagram(config) {
            Ok(d) => Some(d),
            Err(e) => {
                log::error!("Diagram not initialised: {}", e);
                None
            }
        };
        *self.diagram.borrow_mut() = diagram;
        self.hovered = None;
        self.focused = None;

        if config.debounce() != self.debouncer.delay() {
            self.debouncer.cancel();
            self.debouncer =
                Debouncer::new(self.runtime.clone(), config.debounce(), self.tick_tx.clone());
        }
        match self.size {
            Some(size) => self.debouncer.schedule_now(size),
            None => self.drawing_area.queue_draw(),
        }
    }
}
