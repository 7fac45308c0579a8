//! JavaScript evaluated inside the page by `ChromePage`

/// Collect candidates for one query mode, stamping each element with a ref.
///
/// Called as `(mode, arg)`; `mode` is one of `interactive`, `role`, `text`,
/// `css`. Returns `{ ok: true, items: [...] }` or
/// `{ ok: false, error: "invalid-selector", message }`.
pub(super) const COLLECT_CANDIDATES: &str = r#"
(mode, arg) => {
  const ATTR = 'data-kodegen-ref';
  const INTERACTIVE = 'a, button, input[type="submit"], input[type="button"], input[type="reset"], input[type="image"], [role="button"], [role="link"], [role="menuitem"], [role="tab"], [role="checkbox"], [role="option"], [onclick]';

  window.__kodegenRefSeq = window.__kodegenRefSeq || 0;
  const refOf = (el) => {
    let id = el.getAttribute(ATTR);
    if (!id) {
      window.__kodegenRefSeq += 1;
      id = String(window.__kodegenRefSeq);
      el.setAttribute(ATTR, id);
    }
    return `[${ATTR}="${id}"]`;
  };

  const implicitRole = (el) => {
    const explicit = (el.getAttribute('role') || '').trim().split(/\s+/)[0];
    if (explicit) return explicit.toLowerCase();
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'input') {
      const type = (el.getAttribute('type') || 'text').toLowerCase();
      if (['submit', 'button', 'reset', 'image'].includes(type)) return 'button';
      if (type === 'checkbox') return 'checkbox';
      if (type === 'radio') return 'radio';
      return 'textbox';
    }
    if (tag === 'textarea') return 'textbox';
    if (tag === 'select') return 'combobox';
    return 'generic';
  };

  const text = (el) => ((el.innerText !== undefined ? el.innerText : el.textContent) || '').trim();
  const squash = (value) => String(value || '').replace(/\s+/g, ' ').trim().toLowerCase();

  const accessibleName = (el) => {
    const label = el.getAttribute('aria-label');
    if (label && label.trim()) return label.trim();
    const labelledBy = el.getAttribute('aria-labelledby');
    if (labelledBy) {
      const joined = labelledBy.split(/\s+/)
        .map((id) => document.getElementById(id))
        .filter(Boolean)
        .map(text)
        .join(' ')
        .trim();
      if (joined) return joined;
    }
    if (el.tagName === 'INPUT') {
      const value = el.value || el.getAttribute('alt') || '';
      if (value.trim()) return value.trim();
    }
    const own = text(el);
    if (own) return own;
    return (el.getAttribute('title') || el.getAttribute('alt') || '').trim();
  };

  const hiddenFromTree = (el) => {
    if (el.closest('[aria-hidden="true"]')) return true;
    const style = window.getComputedStyle(el);
    return style.display === 'none' || style.visibility === 'hidden';
  };

  const hint = (el) => {
    if (el.id) return `#${CSS.escape(el.id)}`;
    const name = el.getAttribute('name');
    if (name) return `${el.tagName.toLowerCase()}[name="${name.replace(/"/g, '\\"')}"]`;
    return refOf(el);
  };

  const describe = (el) => {
    const r = el.getBoundingClientRect();
    return {
      element: refOf(el),
      tag: el.tagName.toLowerCase(),
      role: implicitRole(el),
      name: accessibleName(el),
      text: text(el),
      selector_hint: hint(el),
      rect: { x: r.left, y: r.top, width: r.width, height: r.height },
    };
  };

  let elements = [];
  if (mode === 'interactive') {
    elements = Array.from(document.querySelectorAll(INTERACTIVE));
  } else if (mode === 'role') {
    elements = Array.from(document.querySelectorAll('*'))
      .filter((el) => implicitRole(el) === arg && !hiddenFromTree(el));
  } else if (mode === 'text') {
    const needle = squash(arg);
    const seen = new Set();
    const walker = document.createTreeWalker(document.body || document.documentElement, NodeFilter.SHOW_TEXT);
    let node;
    while ((node = walker.nextNode())) {
      const value = (node.nodeValue || '').trim();
      const parent = node.parentElement;
      if (!value || !parent || seen.has(parent)) continue;
      if (['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE'].includes(parent.tagName)) continue;
      if (needle && !squash(text(parent)).includes(needle)) continue;
      seen.add(parent);
      elements.push(parent);
    }
  } else if (mode === 'css') {
    try {
      elements = Array.from(document.querySelectorAll(arg));
    } catch (e) {
      return { ok: false, error: 'invalid-selector', message: String(e && e.message || e) };
    }
  }

  return { ok: true, items: elements.map(describe) };
}
"#;

/// Assign a field value in bulk and notify listeners. Called as `(selector, text)`.
pub(super) const FILL_VALUE: &str = r#"
(selector, text) => {
  let el;
  try {
    el = document.querySelector(selector);
  } catch (e) {
    return { ok: false, error: 'invalid-selector', message: String(e && e.message || e) };
  }
  if (!el) return { ok: false, error: 'not-found', message: 'no element matches selector' };
  el.focus();
  if (el.isContentEditable) {
    el.textContent = text;
  } else if ('value' in el) {
    const proto = Object.getPrototypeOf(el);
    const setter = Object.getOwnPropertyDescriptor(proto, 'value');
    if (setter && setter.set) setter.set.call(el, text); else el.value = text;
  } else {
    return { ok: false, error: 'not-fillable', message: `<${el.tagName.toLowerCase()}> has no value` };
  }
  el.dispatchEvent(new Event('input', { bubbles: true }));
  el.dispatchEvent(new Event('change', { bubbles: true }));
  return { ok: true };
}
"#;

pub(super) const VIEWPORT: &str =
    "({ x: 0, y: 0, width: window.innerWidth, height: window.innerHeight })";
