//! Chrome DevTools Protocol adapter for the page traits.
//!
//! Requires the `browser` feature. chromiumoxide is async; the fill is not, so
//! each session owns a tokio runtime and every trait call `block_on`s it.
//!
//! Element handles hold an XPath and a 1-based position rather than a remote
//! object. Every action resolves the node again, which keeps a handle valid
//! across the re-renders the form does after each interaction.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::js_protocol::runtime::{CallArgument, CallFunctionOnParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpTab;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::locator::{ElementHandle, Page, Query, ScriptArg, SearchContext};
use crate::result::{FormError, FormResult};
use crate::wait::not_ready_if_stale;

/// Attached, displayed, enabled and sized; covering is checked with
/// [`HIT_TEST_JS`]
const INTERACTABLE_JS: &str = "function () {
    if (!this.isConnected || this.disabled) { return false; }
    const style = window.getComputedStyle(this);
    if (style.visibility === 'hidden' || style.display === 'none') { return false; }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}";

/// `null` when a click at the element's centre would reach it; otherwise a
/// snippet of the element on top
const HIT_TEST_JS: &str = "function () {
    const rect = this.getBoundingClientRect();
    const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
    if (!hit || hit === this || this.contains(hit)) { return null; }
    return hit.outerHTML.slice(0, 120);
}";

const CLEAR_JS: &str = "function () {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}";

fn driver(e: impl Display) -> FormError {
    FormError::driver(e.to_string())
}

/// How to launch Chrome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Show the browser window
    pub headed: bool,
    /// Disable the Chrome sandbox (containers)
    pub no_sandbox: bool,
    /// Chrome binary; auto-detected when unset
    pub executable: Option<PathBuf>,
    /// Profile directory, so saved logins carry over
    pub profile_dir: Option<PathBuf>,
}

impl LaunchOptions {
    /// Show the browser window
    #[must_use]
    pub const fn with_headed(mut self, headed: bool) -> Self {
        self.headed = headed;
        self
    }

    /// Disable the sandbox
    #[must_use]
    pub const fn with_no_sandbox(mut self, no_sandbox: bool) -> Self {
        self.no_sandbox = no_sandbox;
        self
    }

    /// Use a specific Chrome binary
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Use a profile directory
    #[must_use]
    pub fn with_profile_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(path.into());
        self
    }
}

/// A running browser
#[derive(Debug)]
pub struct CdpSession {
    runtime: Arc<Runtime>,
    browser: Browser,
    handler: JoinHandle<()>,
}

impl CdpSession {
    /// Launch Chrome
    pub fn launch(options: &LaunchOptions) -> FormResult<Self> {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()?,
        );

        let mut builder = BrowserConfig::builder();
        if options.headed {
            builder = builder.with_head();
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.executable {
            builder = builder.chrome_executable(path);
        }
        if let Some(ref dir) = options.profile_dir {
            builder = builder.user_data_dir(dir);
        }
        let config = builder.build().map_err(driver)?;

        let (browser, mut events) = runtime.block_on(Browser::launch(config)).map_err(driver)?;
        let handler = runtime.spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        info!(target: "formfill::cdp", headed = options.headed, "Browser launched");

        Ok(Self {
            runtime,
            browser,
            handler,
        })
    }

    /// Open `url` in a new tab and wait for the navigation to finish
    pub fn open(&self, url: &str) -> FormResult<CdpPage> {
        let tab = self.runtime.block_on(async {
            let tab = self.browser.new_page(url).await.map_err(driver)?;
            tab.wait_for_navigation().await.map_err(driver)?;
            Ok::<_, FormError>(tab)
        })?;
        info!(target: "formfill::cdp", url, "Page opened");
        Ok(CdpPage {
            runtime: Arc::clone(&self.runtime),
            tab,
        })
    }

    /// Close the browser
    pub fn close(self) -> FormResult<()> {
        let Self {
            runtime,
            mut browser,
            handler,
        } = self;
        runtime.block_on(async {
            let _ = browser.close().await.map_err(driver)?;
            let _ = browser.wait().await?;
            Ok::<_, FormError>(())
        })?;
        handler.abort();
        Ok(())
    }
}

/// A tab driven over CDP
#[derive(Debug, Clone)]
pub struct CdpPage {
    runtime: Arc<Runtime>,
    tab: CdpTab,
}

impl CdpPage {
    fn count(&self, xpath: &str) -> FormResult<usize> {
        let expression = format!(
            "document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
            serde_json::to_string(xpath)?
        );
        let n: usize = self.runtime.block_on(async {
            self.tab
                .evaluate(expression)
                .await
                .map_err(driver)?
                .into_value()
                .map_err(driver)
        })?;
        debug!(target: "formfill::cdp", xpath, n, "Evaluated");
        Ok(n)
    }

    fn handles(&self, xpath: String) -> FormResult<Vec<CdpElement>> {
        let n = self.count(&xpath)?;
        Ok((1..=n)
            .map(|index| CdpElement {
                page: self.clone(),
                xpath: xpath.clone(),
                index,
            })
            .collect())
    }
}

impl SearchContext for CdpPage {
    type Element = CdpElement;

    fn find_all(&self, query: &Query) -> FormResult<Vec<CdpElement>> {
        self.handles(query.to_xpath())
    }
}

impl Page for CdpPage {
    fn call_function(
        &self,
        declaration: &str,
        args: &[ScriptArg<'_, CdpElement>],
    ) -> FormResult<()> {
        self.runtime.block_on(async {
            let mut arguments = Vec::with_capacity(args.len());
            let mut receiver = None;
            for arg in args {
                match arg {
                    ScriptArg::Element(e) => {
                        let node = e.resolve().await?;
                        receiver.get_or_insert_with(|| node.remote_object_id.clone());
                        arguments.push(
                            CallArgument::builder()
                                .object_id(node.remote_object_id.clone())
                                .build(),
                        );
                    }
                    ScriptArg::Str(s) => arguments.push(
                        CallArgument::builder()
                            .value(serde_json::Value::String((*s).to_string()))
                            .build(),
                    ),
                }
            }
            let mut params = CallFunctionOnParams::builder()
                .function_declaration(declaration)
                .arguments(arguments);
            if let Some(object_id) = receiver {
                params = params.object_id(object_id);
            }
            let params = params.build().map_err(driver)?;
            let returns = self.tab.execute(params).await.map_err(driver)?;
            match returns.result.exception_details {
                Some(details) => Err(FormError::script(
                    details
                        .exception
                        .and_then(|e| e.description)
                        .unwrap_or(details.text),
                )),
                None => Ok(()),
            }
        })
    }
}

/// An element of a [`CdpPage`], re-resolved on every action
#[derive(Debug, Clone)]
pub struct CdpElement {
    page: CdpPage,
    xpath: String,
    index: usize,
}

impl CdpElement {
    fn expression(&self) -> String {
        format!("({})[{}]", self.xpath, self.index)
    }

    async fn resolve(&self) -> FormResult<Element> {
        let mut found = self
            .page
            .tab
            .find_xpaths(self.xpath.as_str())
            .await
            .map_err(driver)?;
        if self.index == 0 || self.index > found.len() {
            return Err(FormError::stale(self.expression()));
        }
        Ok(found.swap_remove(self.index - 1))
    }

    fn with_node<T, F, Fut>(&self, op: F) -> FormResult<T>
    where
        F: FnOnce(Element) -> Fut,
        Fut: std::future::Future<Output = FormResult<T>>,
    {
        self.page.runtime.block_on(async {
            let node = self.resolve().await?;
            op(node).await
        })
    }
}

impl SearchContext for CdpElement {
    type Element = Self;

    fn find_all(&self, query: &Query) -> FormResult<Vec<Self>> {
        self.find_within(query)
    }
}

impl ElementHandle for CdpElement {
    fn describe(&self) -> String {
        self.expression()
    }

    fn is_interactable(&self) -> FormResult<bool> {
        not_ready_if_stale(self.with_node(|node| async move {
            let shown = node.call_js_fn(INTERACTABLE_JS, false).await.map_err(driver)?;
            if !shown.result.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                return Ok(false);
            }
            let hit = node.call_js_fn(HIT_TEST_JS, false).await.map_err(driver)?;
            Ok(hit.result.value.map_or(true, |v| v.is_null()))
        }))
    }

    fn click(&self) -> FormResult<()> {
        let element = self.describe();
        self.with_node(|node| async move {
            let _ = node.scroll_into_view().await.map_err(driver)?;
            let hit = node.call_js_fn(HIT_TEST_JS, false).await.map_err(driver)?;
            let obscured_by = hit.result.value.and_then(|v| v.as_str().map(String::from));
            if let Some(obscured_by) = obscured_by {
                return Err(FormError::ElementObscured {
                    element,
                    obscured_by,
                    attempts: 1,
                });
            }
            let _ = node.click().await.map_err(driver)?;
            Ok(())
        })
    }

    fn clear(&self) -> FormResult<()> {
        self.with_node(|node| async move {
            let _ = node.call_js_fn(CLEAR_JS, false).await.map_err(driver)?;
            Ok(())
        })
    }

    fn send_keys(&self, text: &str) -> FormResult<()> {
        self.with_node(|node| async move {
            let _ = node.focus().await.map_err(driver)?;
            let _ = node.type_str(text).await.map_err(driver)?;
            Ok(())
        })
    }

    fn upload_file(&self, path: &Path) -> FormResult<()> {
        let file = path.display().to_string();
        let tab = self.page.tab.clone();
        self.with_node(|node| async move {
            let params = SetFileInputFilesParams::builder()
                .file(file)
                .backend_node_id(node.backend_node_id)
                .build()
                .map_err(driver)?;
            let _ = tab.execute(params).await.map_err(driver)?;
            Ok(())
        })
    }

    fn find_within(&self, query: &Query) -> FormResult<Vec<Self>> {
        self.page
            .handles(query.scoped_xpath(&self.xpath, self.index))
    }
}
