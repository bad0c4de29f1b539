//! The interaction runtime injected into every sandbox document.
//!
//! A single self-contained script: hover and selection outlining,
//! drag-to-move with grid and sibling-edge snapping, eight-point resize
//! handles, a floating per-component toolbar, and keyboard shortcuts.
//! It only talks outward through versioned protocol envelopes; script
//! errors are caught locally so a broken user script cannot take the
//! runtime down with it.

use serde::{Deserialize, Serialize};

use crate::protocol::PROTOCOL_VERSION;

/// Knobs for the embedded runtime, substituted into the script text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeOptions {
    pub snap_to_grid: bool,
    pub grid_size: u32,
    /// Pixel distance within which grid/edge snapping engages.
    pub snap_threshold: u32,
    pub edge_snapping: bool,
    pub show_toolbar: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            snap_to_grid: true,
            grid_size: 8,
            snap_threshold: 8,
            edge_snapping: true,
            show_toolbar: true,
        }
    }
}

/// Styles backing the runtime chrome: outlines, handles, toolbar.
pub const RUNTIME_STYLES: &str = "\
.wf-live-component{position:relative;}\
.wf-hover-outline{outline:1px dashed #7c3aed;outline-offset:2px;}\
.wf-selected-outline{outline:2px solid #7c3aed;outline-offset:2px;}\
.wf-resize-handle{position:absolute;width:8px;height:8px;background:#7c3aed;border:1px solid #fff;border-radius:2px;z-index:9999;}\
.wf-handle-nw{top:-4px;left:-4px;cursor:nwse-resize;}\
.wf-handle-n{top:-4px;left:calc(50% - 4px);cursor:ns-resize;}\
.wf-handle-ne{top:-4px;right:-4px;cursor:nesw-resize;}\
.wf-handle-e{top:calc(50% - 4px);right:-4px;cursor:ew-resize;}\
.wf-handle-se{bottom:-4px;right:-4px;cursor:nwse-resize;}\
.wf-handle-s{bottom:-4px;left:calc(50% - 4px);cursor:ns-resize;}\
.wf-handle-sw{bottom:-4px;left:-4px;cursor:nesw-resize;}\
.wf-handle-w{top:calc(50% - 4px);left:-4px;cursor:ew-resize;}\
.wf-toolbar{position:absolute;top:-34px;left:0;display:flex;gap:2px;padding:2px;background:#1e1b2e;border-radius:6px;z-index:10000;}\
.wf-toolbar button{border:none;background:transparent;color:#e4e4e7;font-size:11px;padding:3px 6px;border-radius:4px;cursor:pointer;}\
.wf-toolbar button:hover{background:#7c3aed;}";

const RUNTIME_TEMPLATE: &str = r#"(function(){
'use strict';
var SENDER='__WEFT_SENDER__';
var VERSION=__WEFT_VERSION__;
var GRID=__WEFT_GRID__;
var THRESHOLD=__WEFT_THRESHOLD__;
var SNAP_GRID=__WEFT_SNAP_GRID__;
var SNAP_EDGES=__WEFT_SNAP_EDGES__;
var TOOLBAR=__WEFT_TOOLBAR__;
var MARKER='wf-live-component';

var selected=null;
var toolbar=null;

function post(type,payload){
  var msg={version:VERSION,sender:SENDER,type:type};
  if(payload){for(var k in payload){msg[k]=payload[k]}}
  try{window.parent.postMessage(JSON.stringify(msg),'*')}catch(e){}
}

function instanceId(el){
  return el?el.getAttribute('data-weft-instance'):null;
}

function componentOf(node){
  while(node&&node!==document.body){
    if(node.classList&&node.classList.contains(MARKER)){return node}
    node=node.parentNode;
  }
  return null;
}

function cssPath(el){
  var parts=[];
  while(el&&el.nodeType===1&&el!==document.body&&parts.length<6){
    var part=el.tagName.toLowerCase();
    if(el.id){parts.unshift(part+'#'+el.id);break}
    var cls=(el.className&&typeof el.className==='string')?el.className.trim().split(/\s+/)[0]:null;
    if(cls){part+='.'+cls}
    parts.unshift(part);
    el=el.parentNode;
  }
  return parts.join(' > ');
}

function snap(value,others){
  var best=value;
  if(SNAP_GRID){
    var grid=Math.round(value/GRID)*GRID;
    if(Math.abs(grid-value)<=THRESHOLD){best=grid}
  }
  if(SNAP_EDGES&&others){
    for(var i=0;i<others.length;i++){
      if(Math.abs(others[i]-value)<=THRESHOLD){best=others[i];break}
    }
  }
  return best;
}

function siblingEdges(except){
  var xs=[],ys=[];
  var all=document.querySelectorAll('.'+MARKER);
  for(var i=0;i<all.length;i++){
    if(all[i]===except){continue}
    var r=all[i].getBoundingClientRect();
    xs.push(r.left,r.right);
    ys.push(r.top,r.bottom);
  }
  return {xs:xs,ys:ys};
}

function clearSelection(){
  if(selected){
    selected.classList.remove('wf-selected-outline');
    removeHandles(selected);
    removeToolbar();
  }
  selected=null;
}

function removeHandles(el){
  var handles=el.querySelectorAll('.wf-resize-handle');
  for(var i=handles.length-1;i>=0;i--){handles[i].parentNode.removeChild(handles[i])}
}

function removeToolbar(){
  if(toolbar&&toolbar.parentNode){toolbar.parentNode.removeChild(toolbar)}
  toolbar=null;
}

var DIRECTIONS=['nw','n','ne','e','se','s','sw','w'];

function addHandles(el){
  for(var i=0;i<DIRECTIONS.length;i++){
    var h=document.createElement('div');
    h.className='wf-resize-handle wf-handle-'+DIRECTIONS[i];
    h.setAttribute('data-weft-dir',DIRECTIONS[i]);
    el.appendChild(h);
  }
}

function addToolbar(el){
  if(!TOOLBAR){return}
  removeToolbar();
  toolbar=document.createElement('div');
  toolbar.className='wf-toolbar';
  var actions=[
    ['edit','COMPONENT_EDIT_REQUESTED'],
    ['copy','COMPONENT_DUPLICATE_REQUESTED'],
    ['up','COMPONENT_LAYER_MOVE_REQUESTED','forward'],
    ['down','COMPONENT_LAYER_MOVE_REQUESTED','backward'],
    ['del','COMPONENT_DELETE_REQUESTED']
  ];
  actions.forEach(function(a){
    var b=document.createElement('button');
    b.textContent=a[0];
    b.addEventListener('mousedown',function(ev){
      ev.preventDefault();ev.stopPropagation();
      var payload={instance_id:instanceId(el)};
      if(a[2]){payload.direction=a[2]}
      post(a[1],payload);
    });
    toolbar.appendChild(b);
  });
  el.appendChild(toolbar);
}

function select(el,notify){
  if(selected===el){return}
  clearSelection();
  selected=el;
  el.classList.add('wf-selected-outline');
  addHandles(el);
  addToolbar(el);
  if(notify){
    var r=el.getBoundingClientRect();
    post('COMPONENT_SELECTED',{instance_id:instanceId(el),position:{x:r.left,y:r.top}});
  }
}

// The runtime sits after the user markup, so the document is parsed by now.
post('DOCUMENT_LOADED');

// --- hover outlining ---
document.addEventListener('mouseover',function(ev){
  var c=componentOf(ev.target);
  if(c&&c!==selected){c.classList.add('wf-hover-outline')}
});
document.addEventListener('mouseout',function(ev){
  var c=componentOf(ev.target);
  if(c){c.classList.remove('wf-hover-outline')}
});

// --- selection ---
document.addEventListener('click',function(ev){
  var c=componentOf(ev.target);
  if(c){
    ev.preventDefault();
    select(c,true);
  }else{
    clearSelection();
    post('ELEMENT_SELECTED',{
      selector:cssPath(ev.target),
      outer_markup:(ev.target.outerHTML||'').slice(0,512),
      position:{x:ev.clientX,y:ev.clientY}
    });
  }
});

document.addEventListener('dblclick',function(ev){
  var c=componentOf(ev.target);
  if(c){
    post('COMPONENT_DOUBLE_CLICKED',{instance_id:instanceId(c)});
  }else{
    post('ELEMENT_DOUBLE_CLICKED',{
      selector:cssPath(ev.target),
      outer_markup:(ev.target.outerHTML||'').slice(0,512)
    });
  }
});

// --- drag to move / resize ---
var drag=null;
document.addEventListener('mousedown',function(ev){
  if(ev.target.classList&&ev.target.classList.contains('wf-resize-handle')){
    var host=componentOf(ev.target.parentNode);
    var rect=host.getBoundingClientRect();
    drag={kind:'resize',el:host,dir:ev.target.getAttribute('data-weft-dir'),
      startX:ev.clientX,startY:ev.clientY,w:rect.width,h:rect.height};
    ev.preventDefault();
    return;
  }
  var c=componentOf(ev.target);
  if(c&&c.getAttribute('data-weft-locked')!=='true'){
    var r=c.getBoundingClientRect();
    drag={kind:'move',el:c,startX:ev.clientX,startY:ev.clientY,left:r.left,top:r.top,moved:false};
  }
});

document.addEventListener('mousemove',function(ev){
  if(!drag){return}
  if(drag.kind==='move'){
    var edges=siblingEdges(drag.el);
    var x=snap(drag.left+ev.clientX-drag.startX,edges.xs);
    var y=snap(drag.top+ev.clientY-drag.startY,edges.ys);
    drag.el.style.position='absolute';
    drag.el.style.left=x+'px';
    drag.el.style.top=y+'px';
    drag.x=x;drag.y=y;drag.moved=true;
  }else{
    var dx=ev.clientX-drag.startX;
    var dy=ev.clientY-drag.startY;
    var w=drag.w,h=drag.h;
    if(drag.dir.indexOf('e')>=0){w=drag.w+dx}
    if(drag.dir.indexOf('w')>=0){w=drag.w-dx}
    if(drag.dir.indexOf('s')>=0){h=drag.h+dy}
    if(drag.dir.indexOf('n')>=0){h=drag.h-dy}
    w=Math.max(16,snap(w,null));
    h=Math.max(16,snap(h,null));
    drag.el.style.width=w+'px';
    drag.el.style.height=h+'px';
    drag.w2=w;drag.h2=h;
  }
});

document.addEventListener('mouseup',function(){
  if(!drag){return}
  if(drag.kind==='move'&&drag.moved){
    post('COMPONENT_MOVED',{instance_id:instanceId(drag.el),position:{x:drag.x,y:drag.y}});
  }
  if(drag.kind==='resize'&&drag.w2!==undefined){
    post('COMPONENT_RESIZED',{instance_id:instanceId(drag.el),width:drag.w2,height:drag.h2});
  }
  drag=null;
});

// --- keyboard shortcuts ---
document.addEventListener('keydown',function(ev){
  var mod=ev.ctrlKey||ev.metaKey;
  if(mod&&ev.key==='s'){ev.preventDefault();post('SAVE_REQUESTED')}
  else if(mod&&ev.key==='z'&&ev.shiftKey){ev.preventDefault();post('REDO_REQUESTED')}
  else if(mod&&ev.key==='z'){ev.preventDefault();post('UNDO_REQUESTED')}
  else if(mod&&ev.key==='d'&&selected){ev.preventDefault();post('COMPONENT_DUPLICATE_REQUESTED',{instance_id:instanceId(selected)})}
  else if((ev.key==='Delete'||ev.key==='Backspace')&&selected){ev.preventDefault();post('COMPONENT_DELETE_REQUESTED',{instance_id:instanceId(selected)})}
});

// --- content size reporting ---
function reportSize(){
  post('CONTENT_RESIZED',{width:document.body.scrollWidth,height:document.body.scrollHeight});
}
if(window.ResizeObserver){
  new ResizeObserver(reportSize).observe(document.body);
}
window.addEventListener('load',reportSize);

post('RUNTIME_READY');
})();"#;

/// Render the runtime script for one renderer identity.
pub fn interaction_runtime(sender: &str, options: &RuntimeOptions) -> String {
    RUNTIME_TEMPLATE
        .replace("__WEFT_SENDER__", sender)
        .replace("__WEFT_VERSION__", &PROTOCOL_VERSION.to_string())
        .replace("__WEFT_GRID__", &options.grid_size.to_string())
        .replace("__WEFT_THRESHOLD__", &options.snap_threshold.to_string())
        .replace("__WEFT_SNAP_GRID__", bool_js(options.snap_to_grid))
        .replace("__WEFT_SNAP_EDGES__", bool_js(options.edge_snapping))
        .replace("__WEFT_TOOLBAR__", bool_js(options.show_toolbar))
}

fn bool_js(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
